//! Batch payroll run over a whole employee set.
//!
//! Configuration problems abort the run before the first employee is touched.
//! Bad attendance data only skips the affected employee. Records come out sorted
//! by division and employee id, so identical input gives identical output.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{atomic::{AtomicBool, Ordering}, Arc},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    attendance::{self, AttendanceEntry, MissingDayPolicy},
    calendar::{Period, WorkingCalendar},
    compensation::{build_gross_pay, RateConfig},
    deduction::{validate_months, BpjsBasis, DeductionEngine, RateTables, TaxPolicy},
    employee::{Employee, PeriodInputs},
    error::{ConfigurationError, DataQualityError, EngineError},
    payroll::{assemble_payroll, summarize, OtherDeductions, PayrollPeriod, PayrollRecord, PayrollSummary},
    store::{PayrollSink, PayrollSource, PeriodRepository},
};

/// Everything about a run that is policy rather than master data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PayrollPolicy {
    pub rates: RateConfig,
    pub tax: TaxPolicy,
    pub missing_day: MissingDayPolicy,
    pub bpjs_basis: BpjsBasis,
}

impl PayrollPolicy {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.rates.validate()?;
        self.tax.validate()
    }
}

/// Checked between employees, never in the middle of one.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PayrollInput {
    pub calendar: WorkingCalendar,
    pub employees: Vec<Employee>,
    pub attendance: Vec<AttendanceEntry>,
    pub inputs: HashMap<Uuid, PeriodInputs>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEmployee {
    pub employee_id: Uuid,
    pub full_name: String,
    pub reason: DataQualityError,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub period: Period,
    pub success_count: usize,
    pub skipped: Vec<SkippedEmployee>,
    pub warning_count: usize,
    pub cancelled: bool,
    pub records: Vec<PayrollRecord>,
    pub summary: PayrollSummary,
}

enum EmployeeFailure {
    Data(DataQualityError),
    Configuration(ConfigurationError),
}

impl From<DataQualityError> for EmployeeFailure {
    fn from(error: DataQualityError) -> Self {
        EmployeeFailure::Data(error)
    }
}

impl From<ConfigurationError> for EmployeeFailure {
    fn from(error: ConfigurationError) -> Self {
        EmployeeFailure::Configuration(error)
    }
}

pub struct PayrollRun<'a> {
    tables: &'a RateTables,
    policy: &'a PayrollPolicy,
}

impl<'a> PayrollRun<'a> {
    pub fn new(tables: &'a RateTables, policy: &'a PayrollPolicy) -> Result<Self, ConfigurationError> {
        policy.validate()?;

        Ok(Self { tables, policy })
    }

    /// Configuration that only shows up per employee, checked up front.
    pub fn preflight(&self, employees: &[Employee], inputs: &HashMap<Uuid, PeriodInputs>) -> Result<(), ConfigurationError> {
        for employee in employees {
            self.tables.ptkp.lookup(employee.ptkp_code)?;
        }

        for months in inputs.values().filter_map(|inputs| inputs.annualization_months) {
            validate_months(months)?;
        }

        Ok(())
    }

    pub fn execute(&self, period: Period, input: &PayrollInput, cancel: &CancelFlag) -> Result<RunReport, ConfigurationError> {
        self.preflight(&input.employees, &input.inputs)?;

        info!(%period, employees = input.employees.len(), "payroll run started");

        let mut attendance_by_employee = BTreeMap::<Uuid, Vec<AttendanceEntry>>::new();
        for entry in &input.attendance {
            attendance_by_employee.entry(entry.employee_id).or_default().push(entry.clone());
        }

        let mut employees = input.employees.iter().collect::<Vec<_>>();
        employees.sort_by(|a, b| (&a.division, a.id).cmp(&(&b.division, b.id)));

        let no_inputs = PeriodInputs::default();
        let no_entries = Vec::new();

        let mut records = Vec::with_capacity(employees.len());
        let mut skipped = Vec::new();
        let mut cancelled = false;

        for employee in employees {
            if cancel.is_cancelled() {
                warn!(%period, processed = records.len() + skipped.len(), "payroll run cancelled");
                cancelled = true;
                break;
            }

            let entries = attendance_by_employee.get(&employee.id).unwrap_or(&no_entries);
            let inputs = input.inputs.get(&employee.id).unwrap_or(&no_inputs);

            match self.compute_employee(employee, period, &input.calendar, entries, inputs) {
                Ok(record) => {
                    debug!(employee_id = %employee.id, gross = %record.gross_pay, net = %record.net_pay, "payroll computed");
                    records.push(record);
                }
                Err(EmployeeFailure::Data(reason)) => {
                    warn!(employee_id = %employee.id, %reason, "employee skipped");
                    skipped.push(SkippedEmployee {
                        employee_id: employee.id,
                        full_name: employee.full_name.clone(),
                        message: reason.to_string(),
                        reason,
                    });
                }
                Err(EmployeeFailure::Configuration(error)) => return Err(error),
            }
        }

        for id in attendance_by_employee.keys().filter(|id| !input.employees.iter().any(|e| e.id == **id)) {
            warn!(employee_id = %id, "attendance records for an unknown employee ignored");
        }

        let summary = summarize(&records);
        let warning_count = records.iter().map(|record| record.warnings.len()).sum();

        info!(%period, success = records.len(), skipped = skipped.len(), warning_count, cancelled, "payroll run finished");

        Ok(RunReport {
            period,
            success_count: records.len(),
            skipped,
            warning_count,
            cancelled,
            records,
            summary,
        })
    }

    fn compute_employee(
        &self,
        employee: &Employee,
        period: Period,
        calendar: &WorkingCalendar,
        entries: &[AttendanceEntry],
        inputs: &PeriodInputs,
    ) -> Result<PayrollRecord, EmployeeFailure> {
        let summary = attendance::aggregate(employee.id, period, calendar, entries, self.policy.missing_day)?;

        let compensation = build_gross_pay(employee, &summary, inputs, &self.policy.rates);

        let bpjs_base = match self.policy.bpjs_basis {
            BpjsBasis::GrossPay => compensation.gross_pay,
            BpjsBasis::BasePlusFixedAllowances => compensation.fixed_pay(),
        };

        let months = inputs.annualization_months.unwrap_or(self.policy.tax.annualization_months);
        let deductions = DeductionEngine::new(self.tables, &self.policy.tax)
            .compute_deductions_annualized(compensation.gross_pay, employee.ptkp_code, bpjs_base, months)?;

        let other_deductions = OtherDeductions {
            loan: inputs.loan,
            misc: inputs.misc_deduction,
        };

        Ok(assemble_payroll(employee, period, summary, compensation, deductions, other_deductions))
    }
}

/// Pulls everything for `period` from `source` and runs it.
pub async fn run_payroll<S: PayrollSource>(
    source: &S,
    period: Period,
    policy: &PayrollPolicy,
    cancel: &CancelFlag,
) -> Result<RunReport, EngineError> {
    let tables = RateTables::load(
        source.ptkp_table().await?,
        source.tax_brackets(period.year()).await?,
        source.bpjs_rates().await?,
    )?;

    let input = PayrollInput {
        calendar: WorkingCalendar::new(source.holidays(period.year()).await?),
        employees: source.employees().await?,
        attendance: source.attendance(period).await?,
        inputs: source.period_inputs(period).await?,
    };

    Ok(PayrollRun::new(&tables, policy)?.execute(period, &input, cancel)?)
}

/// Runs a stored payroll period and persists its records.
///
/// Only draft and processing periods can be run. A configuration error moves the
/// period to failed with the reason attached. A cancelled run stores nothing and
/// leaves the period in processing so it can be run again.
pub async fn run_period<S>(
    store: &S,
    mut payroll_period: PayrollPeriod,
    policy: &PayrollPolicy,
    cancel: &CancelFlag,
) -> Result<RunReport, EngineError>
where
    S: PayrollSource + PayrollSink + PeriodRepository,
{
    let period_id = payroll_period.id;
    payroll_period.start_processing()?;
    store.save_period(&payroll_period).await?;

    match run_payroll(store, payroll_period.period, policy, cancel).await {
        Ok(report) if report.cancelled => Ok(report),
        Ok(report) => {
            store.save_payroll_records(period_id, &report.records).await?;
            Ok(report)
        }
        Err(EngineError::Configuration(reason)) => {
            error!(%period_id, %reason, "payroll run aborted");

            payroll_period.fail(reason.to_string())?;
            store.save_period(&payroll_period).await?;

            Err(reason.into())
        }
        Err(error) => Err(error),
    }
}
