use std::{
    collections::{BTreeMap, HashMap},
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use chrono::Datelike as _;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    attendance::AttendanceEntry,
    calendar::{Holiday, Period},
    deduction::{BpjsRate, BpjsRateTable, BracketTable, PtkpCode, PtkpTable, TaxBracket},
    employee::{Employee, PeriodInputs},
    error::EngineError,
    payroll::{PayrollPeriod, PayrollRecord},
};

use super::{PayrollSink, PayrollSource, PeriodRepository, RateRepository};

#[derive(Debug, Default)]
struct Data {
    employees: Vec<Employee>,
    attendance: Vec<AttendanceEntry>,
    inputs: HashMap<(Period, Uuid), PeriodInputs>,
    holidays: Vec<Holiday>,
    ptkp: Vec<(PtkpCode, Decimal)>,
    brackets: BTreeMap<i32, Vec<TaxBracket>>,
    bpjs: Vec<BpjsRate>,
    periods: HashMap<Uuid, PayrollPeriod>,
    records: HashMap<Uuid, Vec<PayrollRecord>>,
}

/// In-process store for tests and one-off runs. Rate tables start out empty,
/// [`MemoryStore::with_default_rates`] seeds the statutory ones.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Data>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statutory PTKP, brackets and BPJS rates, brackets effective from `year`
    pub fn with_default_rates(year: i32) -> Self {
        let store = Self::new();

        {
            let mut data = store.write();
            data.ptkp = PtkpTable::default().iter().collect();
            data.brackets.insert(year, BracketTable::default().brackets().to_vec());
            data.bpjs = BpjsRateTable::default().rates().to_vec();
        }

        store
    }

    pub fn add_employee(&self, employee: Employee) {
        self.write().employees.push(employee);
    }

    pub fn add_attendance(&self, entries: impl IntoIterator<Item = AttendanceEntry>) {
        self.write().attendance.extend(entries);
    }

    pub fn add_holidays(&self, holidays: impl IntoIterator<Item = Holiday>) {
        self.write().holidays.extend(holidays);
    }

    pub fn set_period_inputs(&self, period: Period, employee_id: Uuid, inputs: PeriodInputs) {
        self.write().inputs.insert((period, employee_id), inputs);
    }

    fn read(&self) -> RwLockReadGuard<'_, Data> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Data> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PayrollSource for MemoryStore {
    async fn employees(&self) -> Result<Vec<Employee>, EngineError> {
        Ok(self.read().employees.clone())
    }

    async fn attendance(&self, period: Period) -> Result<Vec<AttendanceEntry>, EngineError> {
        Ok(self.read().attendance.iter()
            .filter(|entry| period.contains(entry.date))
            .cloned()
            .collect())
    }

    async fn period_inputs(&self, period: Period) -> Result<HashMap<Uuid, PeriodInputs>, EngineError> {
        Ok(self.read().inputs.iter()
            .filter(|((p, _), _)| *p == period)
            .map(|((_, id), inputs)| (*id, inputs.clone()))
            .collect())
    }

    async fn ptkp_table(&self) -> Result<Vec<(PtkpCode, Decimal)>, EngineError> {
        Ok(self.read().ptkp.clone())
    }

    async fn tax_brackets(&self, year: i32) -> Result<Vec<TaxBracket>, EngineError> {
        Ok(self.read().brackets.range(..=year)
            .next_back()
            .map(|(_, brackets)| brackets.clone())
            .unwrap_or_default())
    }

    async fn bpjs_rates(&self) -> Result<Vec<BpjsRate>, EngineError> {
        Ok(self.read().bpjs.clone())
    }

    async fn holidays(&self, year: i32) -> Result<Vec<Holiday>, EngineError> {
        Ok(self.read().holidays.iter()
            .filter(|holiday| holiday.date.year() == year)
            .cloned()
            .collect())
    }
}

impl PayrollSink for MemoryStore {
    async fn save_payroll_records(&self, period_id: Uuid, records: &[PayrollRecord]) -> Result<(), EngineError> {
        self.write().records.insert(period_id, records.to_vec());
        Ok(())
    }

    async fn payroll_records(&self, period_id: Uuid) -> Result<Vec<PayrollRecord>, EngineError> {
        Ok(self.read().records.get(&period_id).cloned().unwrap_or_default())
    }
}

impl RateRepository for MemoryStore {
    async fn replace_ptkp_table(&self, table: &PtkpTable) -> Result<(), EngineError> {
        self.write().ptkp = table.iter().collect();
        Ok(())
    }

    async fn replace_tax_brackets(&self, year: i32, table: &BracketTable) -> Result<(), EngineError> {
        self.write().brackets.insert(year, table.brackets().to_vec());
        Ok(())
    }

    async fn replace_bpjs_rates(&self, table: &BpjsRateTable) -> Result<(), EngineError> {
        self.write().bpjs = table.rates().to_vec();
        Ok(())
    }
}

impl PeriodRepository for MemoryStore {
    async fn create_period(&self, period: Period) -> Result<PayrollPeriod, EngineError> {
        let payroll_period = PayrollPeriod::new(period);
        self.write().periods.insert(payroll_period.id, payroll_period.clone());

        Ok(payroll_period)
    }

    async fn find_period(&self, id: Uuid) -> Result<PayrollPeriod, EngineError> {
        self.read().periods.get(&id).cloned().ok_or(EngineError::PeriodNotFound(id))
    }

    async fn save_period(&self, period: &PayrollPeriod) -> Result<(), EngineError> {
        match self.write().periods.get_mut(&period.id) {
            Some(stored) => {
                *stored = period.clone();
                Ok(())
            }
            None => Err(EngineError::PeriodNotFound(period.id)),
        }
    }
}
