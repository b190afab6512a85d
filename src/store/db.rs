use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    attendance::{AttendanceEntry, AttendanceStatus},
    calendar::{Holiday, HolidayType, Period},
    deduction::{BpjsProgram, BpjsRate, BpjsRateTable, BracketTable, PtkpCode, PtkpTable, TaxBracket},
    employee::{Allowance, AllowanceKind, Employee, PeriodInputs, WorkerType},
    entity::{
        attendance_record, bpjs_rate, employee, employee_allowance, holiday, payroll_period, payroll_record,
        period_input, ptkp_rate, sea_orm_active_enums as db_enum, tax_bracket,
    },
    error::{CalendarError, ConfigurationError, EngineError},
    payroll::{self, PayrollPeriod, PayrollRecord, PeriodStatus},
};

use super::{PayrollSink, PayrollSource, PeriodRepository, RateRepository};

/// Postgres backed store over sea-orm.
#[derive(Debug)]
pub struct DbStore {
    db: DatabaseConnection,
}

impl DbStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn period_of(year: i32, month: i32) -> Result<Period, CalendarError> {
    let month = u32::try_from(month).map_err(|_| CalendarError::InvalidPeriod { year, month: 0 })?;

    Period::new(year, month)
}

fn year_range(year: i32) -> Result<(NaiveDate, NaiveDate), CalendarError> {
    Ok((Period::new(year, 1)?.first_day(), Period::new(year, 12)?.last_day()))
}

fn months_of(value: Option<i16>) -> Result<Option<u8>, ConfigurationError> {
    value
        .map(|months| {
            u8::try_from(months).map_err(|_| ConfigurationError::InvalidPolicy {
                key: "annualization_months".to_string(),
                value: months.to_string(),
            })
        })
        .transpose()
}

impl PayrollSource for DbStore {
    async fn employees(&self) -> Result<Vec<Employee>, EngineError> {
        let employees = employee::Entity::find()
            .filter(employee::Column::IsActive.eq(true))
            .order_by_asc(employee::Column::Id)
            .all(&self.db).await?;

        let mut allowances = HashMap::<Uuid, Vec<Allowance>>::new();
        for allowance in employee_allowance::Entity::find()
            .filter(employee_allowance::Column::EmployeeId.is_in(employees.iter().map(|e| e.id)))
            .order_by_asc(employee_allowance::Column::Id)
            .all(&self.db).await?
        {
            allowances.entry(allowance.employee_id).or_default().push(Allowance {
                kind: allowance.allowance_type.into(),
                amount: allowance.amount,
            });
        }

        employees.into_iter()
            .map(|model| -> Result<Employee, EngineError> {
                Ok(Employee {
                    ptkp_code: model.ptkp_code.parse::<PtkpCode>()?,
                    allowances: allowances.remove(&model.id).unwrap_or_default(),
                    id: model.id,
                    full_name: model.full_name,
                    division: model.division,
                    position: model.position,
                    worker_type: model.worker_type.into(),
                    base_salary: model.base_salary,
                    npwp: model.npwp,
                })
            })
            .collect()
    }

    async fn attendance(&self, period: Period) -> Result<Vec<AttendanceEntry>, EngineError> {
        let records = attendance_record::Entity::find()
            .filter(attendance_record::Column::Date.between(period.first_day(), period.last_day()))
            .order_by_asc(attendance_record::Column::EmployeeId)
            .order_by_asc(attendance_record::Column::Date)
            .all(&self.db).await?;

        debug!(%period, count = records.len(), "attendance records loaded");

        Ok(records.into_iter()
            .map(|record| AttendanceEntry {
                employee_id: record.employee_id,
                date: record.date,
                status: record.status.into(),
                overtime_hours: record.overtime_hours,
            })
            .collect())
    }

    async fn period_inputs(&self, period: Period) -> Result<HashMap<Uuid, PeriodInputs>, EngineError> {
        let rows = period_input::Entity::find()
            .filter(period_input::Column::Year.eq(period.year()))
            .filter(period_input::Column::Month.eq(period.month() as i32))
            .all(&self.db).await?;

        rows.into_iter()
            .map(|row| -> Result<(Uuid, PeriodInputs), EngineError> {
                Ok((row.employee_id, PeriodInputs {
                    tonnage: row.tonnage,
                    other_income: row.other_income,
                    loan: row.loan,
                    misc_deduction: row.misc_deduction,
                    annualization_months: months_of(row.annualization_months)?,
                }))
            })
            .collect()
    }

    async fn ptkp_table(&self) -> Result<Vec<(PtkpCode, Decimal)>, EngineError> {
        let rows = ptkp_rate::Entity::find().all(&self.db).await?;

        rows.into_iter()
            .map(|row| -> Result<(PtkpCode, Decimal), EngineError> { Ok((row.code.parse::<PtkpCode>()?, row.threshold)) })
            .collect()
    }

    async fn tax_brackets(&self, year: i32) -> Result<Vec<TaxBracket>, EngineError> {
        let rows = tax_bracket::Entity::find()
            .filter(tax_bracket::Column::Year.lte(year))
            .order_by_desc(tax_bracket::Column::Year)
            .order_by_asc(tax_bracket::Column::LowerBound)
            .all(&self.db).await?;

        let Some(effective) = rows.first().map(|row| row.year) else {
            return Ok(Vec::new())
        };

        debug!(year, effective, "tax brackets loaded");

        Ok(rows.into_iter()
            .take_while(|row| row.year == effective)
            .map(|row| TaxBracket {
                min: row.lower_bound,
                max: row.upper_bound,
                rate: row.rate,
            })
            .collect())
    }

    async fn bpjs_rates(&self) -> Result<Vec<BpjsRate>, EngineError> {
        let rows = bpjs_rate::Entity::find().all(&self.db).await?;

        Ok(rows.into_iter()
            .map(|row| BpjsRate {
                program: row.program.into(),
                employee_rate: row.employee_rate,
                employer_rate: row.employer_rate,
                salary_cap: row.salary_cap,
            })
            .collect())
    }

    async fn holidays(&self, year: i32) -> Result<Vec<Holiday>, EngineError> {
        let (first, last) = year_range(year)?;

        let rows = holiday::Entity::find()
            .filter(holiday::Column::Date.between(first, last))
            .order_by_asc(holiday::Column::Date)
            .all(&self.db).await?;

        Ok(rows.into_iter()
            .map(|row| Holiday {
                date: row.date,
                name: row.name,
                kind: row.holiday_type.into(),
                is_paid: row.is_paid,
            })
            .collect())
    }
}

impl PayrollSink for DbStore {
    async fn save_payroll_records(&self, period_id: Uuid, records: &[PayrollRecord]) -> Result<(), EngineError> {
        let now = Local::now().fixed_offset();

        let models = records.iter()
            .map(|record| -> Result<payroll_record::ActiveModel, DbErr> {
                Ok(payroll_record::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    created_at: Set(now),
                    payroll_period_id: Set(period_id),
                    employee_id: Set(record.employee_id),
                    division: Set(record.division.clone()),
                    gross_pay: Set(record.gross_pay),
                    total_deductions: Set(record.total_deductions),
                    net_pay: Set(record.net_pay),
                    detail: Set(serde_json::to_value(record).map_err(|e| DbErr::Json(e.to_string()))?),
                })
            })
            .collect::<Result<Vec<_>, DbErr>>()?;

        let txn = self.db.begin().await?;

        payroll_record::Entity::delete_many()
            .filter(payroll_record::Column::PayrollPeriodId.eq(period_id))
            .exec(&txn).await?;

        if !models.is_empty() {
            payroll_record::Entity::insert_many(models)
                .exec_without_returning(&txn).await?;
        }

        txn.commit().await?;

        info!(%period_id, count = records.len(), "payroll records saved");

        Ok(())
    }

    async fn payroll_records(&self, period_id: Uuid) -> Result<Vec<PayrollRecord>, EngineError> {
        let rows = payroll_record::Entity::find()
            .filter(payroll_record::Column::PayrollPeriodId.eq(period_id))
            .order_by_asc(payroll_record::Column::Division)
            .order_by_asc(payroll_record::Column::EmployeeId)
            .all(&self.db).await?;

        rows.into_iter()
            .map(|row| -> Result<PayrollRecord, EngineError> {
                Ok(serde_json::from_value(row.detail).map_err(|e| DbErr::Json(e.to_string()))?)
            })
            .collect()
    }
}

impl RateRepository for DbStore {
    async fn replace_ptkp_table(&self, table: &PtkpTable) -> Result<(), EngineError> {
        let models = table.iter()
            .map(|(code, threshold)| ptkp_rate::ActiveModel {
                code: Set(code.to_string()),
                threshold: Set(threshold),
            })
            .collect::<Vec<_>>();

        let txn = self.db.begin().await?;

        ptkp_rate::Entity::delete_many().exec(&txn).await?;
        if !models.is_empty() {
            ptkp_rate::Entity::insert_many(models).exec_without_returning(&txn).await?;
        }

        txn.commit().await?;

        info!("PTKP table replaced");

        Ok(())
    }

    async fn replace_tax_brackets(&self, year: i32, table: &BracketTable) -> Result<(), EngineError> {
        let models = table.brackets().iter()
            .map(|bracket| tax_bracket::ActiveModel {
                id: Set(Uuid::new_v4()),
                year: Set(year),
                lower_bound: Set(bracket.min),
                upper_bound: Set(bracket.max),
                rate: Set(bracket.rate),
            })
            .collect::<Vec<_>>();

        let txn = self.db.begin().await?;

        tax_bracket::Entity::delete_many()
            .filter(tax_bracket::Column::Year.eq(year))
            .exec(&txn).await?;
        tax_bracket::Entity::insert_many(models).exec_without_returning(&txn).await?;

        txn.commit().await?;

        info!(year, "tax brackets replaced");

        Ok(())
    }

    async fn replace_bpjs_rates(&self, table: &BpjsRateTable) -> Result<(), EngineError> {
        let models = table.rates().iter()
            .map(|rate| bpjs_rate::ActiveModel {
                id: Set(Uuid::new_v4()),
                program: Set(rate.program.into()),
                employee_rate: Set(rate.employee_rate),
                employer_rate: Set(rate.employer_rate),
                salary_cap: Set(rate.salary_cap),
            })
            .collect::<Vec<_>>();

        let txn = self.db.begin().await?;

        bpjs_rate::Entity::delete_many().exec(&txn).await?;
        bpjs_rate::Entity::insert_many(models).exec_without_returning(&txn).await?;

        txn.commit().await?;

        info!("BPJS rates replaced");

        Ok(())
    }
}

impl PeriodRepository for DbStore {
    async fn create_period(&self, period: Period) -> Result<PayrollPeriod, EngineError> {
        let now = Local::now().fixed_offset();
        let payroll_period = PayrollPeriod::new(period);

        let model = payroll_period::Entity::insert(payroll_period::ActiveModel {
            id: Set(payroll_period.id),
            created_at: Set(now),
            updated_at: Set(now),
            year: Set(period.year()),
            month: Set(period.month() as i32),
            status: Set(payroll_period.status.into()),
            failure_reason: Set(None),
        }).exec_with_returning(&self.db).await?;

        model.try_into()
    }

    async fn find_period(&self, id: Uuid) -> Result<PayrollPeriod, EngineError> {
        let Some(model) = payroll_period::Entity::find_by_id(id).one(&self.db).await? else {
            return Err(EngineError::PeriodNotFound(id))
        };

        model.try_into()
    }

    async fn save_period(&self, period: &PayrollPeriod) -> Result<(), EngineError> {
        let result = payroll_period::Entity::update_many()
            .set(payroll_period::ActiveModel {
                updated_at: Set(Local::now().fixed_offset()),
                status: Set(period.status.into()),
                failure_reason: Set(period.failure_reason.clone()),
                ..Default::default()
            })
            .filter(payroll_period::Column::Id.eq(period.id))
            .exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(EngineError::PeriodNotFound(period.id))
        }

        Ok(())
    }
}

impl TryFrom<payroll_period::Model> for payroll::PayrollPeriod {
    type Error = EngineError;

    fn try_from(model: payroll_period::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            period: period_of(model.year, model.month)?,
            status: model.status.into(),
            failure_reason: model.failure_reason,
        })
    }
}

impl From<db_enum::WorkerType> for WorkerType {
    fn from(value: db_enum::WorkerType) -> Self {
        match value {
            db_enum::WorkerType::Harvester => WorkerType::Harvester,
            db_enum::WorkerType::Staff => WorkerType::Staff,
        }
    }
}

impl From<db_enum::AllowanceType> for AllowanceKind {
    fn from(value: db_enum::AllowanceType) -> Self {
        match value {
            db_enum::AllowanceType::Housing => AllowanceKind::Housing,
            db_enum::AllowanceType::Meal => AllowanceKind::Meal,
            db_enum::AllowanceType::Other => AllowanceKind::Other,
            db_enum::AllowanceType::Position => AllowanceKind::Position,
            db_enum::AllowanceType::Skill => AllowanceKind::Skill,
            db_enum::AllowanceType::Transport => AllowanceKind::Transport,
        }
    }
}

impl From<db_enum::AttendanceStatus> for AttendanceStatus {
    fn from(value: db_enum::AttendanceStatus) -> Self {
        match value {
            db_enum::AttendanceStatus::Absent => AttendanceStatus::Absent,
            db_enum::AttendanceStatus::Late => AttendanceStatus::Late,
            db_enum::AttendanceStatus::Leave => AttendanceStatus::Leave,
            db_enum::AttendanceStatus::Present => AttendanceStatus::Present,
            db_enum::AttendanceStatus::Sick => AttendanceStatus::Sick,
        }
    }
}

impl From<db_enum::HolidayType> for HolidayType {
    fn from(value: db_enum::HolidayType) -> Self {
        match value {
            db_enum::HolidayType::Company => HolidayType::Company,
            db_enum::HolidayType::National => HolidayType::National,
            db_enum::HolidayType::Regional => HolidayType::Regional,
        }
    }
}

impl From<db_enum::BpjsProgram> for BpjsProgram {
    fn from(value: db_enum::BpjsProgram) -> Self {
        match value {
            db_enum::BpjsProgram::Health => BpjsProgram::Health,
            db_enum::BpjsProgram::Jht => BpjsProgram::Jht,
            db_enum::BpjsProgram::Jkk => BpjsProgram::Jkk,
            db_enum::BpjsProgram::Jkm => BpjsProgram::Jkm,
            db_enum::BpjsProgram::Jp => BpjsProgram::Jp,
        }
    }
}

impl From<BpjsProgram> for db_enum::BpjsProgram {
    fn from(value: BpjsProgram) -> Self {
        match value {
            BpjsProgram::Health => db_enum::BpjsProgram::Health,
            BpjsProgram::Jht => db_enum::BpjsProgram::Jht,
            BpjsProgram::Jkk => db_enum::BpjsProgram::Jkk,
            BpjsProgram::Jkm => db_enum::BpjsProgram::Jkm,
            BpjsProgram::Jp => db_enum::BpjsProgram::Jp,
        }
    }
}

impl From<db_enum::PeriodStatus> for PeriodStatus {
    fn from(value: db_enum::PeriodStatus) -> Self {
        match value {
            db_enum::PeriodStatus::Cancelled => PeriodStatus::Cancelled,
            db_enum::PeriodStatus::Draft => PeriodStatus::Draft,
            db_enum::PeriodStatus::Failed => PeriodStatus::Failed,
            db_enum::PeriodStatus::Finalized => PeriodStatus::Finalized,
            db_enum::PeriodStatus::Paid => PeriodStatus::Paid,
            db_enum::PeriodStatus::Processing => PeriodStatus::Processing,
        }
    }
}

impl From<PeriodStatus> for db_enum::PeriodStatus {
    fn from(value: PeriodStatus) -> Self {
        match value {
            PeriodStatus::Cancelled => db_enum::PeriodStatus::Cancelled,
            PeriodStatus::Draft => db_enum::PeriodStatus::Draft,
            PeriodStatus::Failed => db_enum::PeriodStatus::Failed,
            PeriodStatus::Finalized => db_enum::PeriodStatus::Finalized,
            PeriodStatus::Paid => db_enum::PeriodStatus::Paid,
            PeriodStatus::Processing => db_enum::PeriodStatus::Processing,
        }
    }
}
