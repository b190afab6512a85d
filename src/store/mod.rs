//! Data access seams for the engine.
//!
//! The engine never fetches or persists anything itself. A run pulls its inputs
//! through [`PayrollSource`] and hands results to [`PayrollSink`]. Master rate
//! tables are only ever replaced whole through [`RateRepository`], which accepts
//! already validated tables so a broken table can never be stored.

use std::collections::HashMap;

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

mod db;
mod memory;

pub use db::DbStore;
pub use memory::MemoryStore;

#[allow(async_fn_in_trait)]
pub trait PayrollSource {
    /// Active employees only
    async fn employees(&self) -> Result<Vec<Employee>, EngineError>;

    async fn attendance(&self, period: Period) -> Result<Vec<AttendanceEntry>, EngineError>;

    async fn period_inputs(&self, period: Period) -> Result<HashMap<Uuid, PeriodInputs>, EngineError>;

    async fn ptkp_table(&self) -> Result<Vec<(PtkpCode, Decimal)>, EngineError>;

    /// Brackets in effect for `year`: the latest table whose year is not after it
    async fn tax_brackets(&self, year: i32) -> Result<Vec<TaxBracket>, EngineError>;

    async fn bpjs_rates(&self) -> Result<Vec<BpjsRate>, EngineError>;

    async fn holidays(&self, year: i32) -> Result<Vec<Holiday>, EngineError>;
}

#[allow(async_fn_in_trait)]
pub trait PayrollSink {
    /// Replaces every record previously stored for the period.
    async fn save_payroll_records(&self, period_id: Uuid, records: &[PayrollRecord]) -> Result<(), EngineError>;

    async fn payroll_records(&self, period_id: Uuid) -> Result<Vec<PayrollRecord>, EngineError>;
}

#[allow(async_fn_in_trait)]
pub trait RateRepository {
    async fn replace_ptkp_table(&self, table: &PtkpTable) -> Result<(), EngineError>;

    async fn replace_tax_brackets(&self, year: i32, table: &BracketTable) -> Result<(), EngineError>;

    async fn replace_bpjs_rates(&self, table: &BpjsRateTable) -> Result<(), EngineError>;
}

#[allow(async_fn_in_trait)]
pub trait PeriodRepository {
    async fn create_period(&self, period: Period) -> Result<PayrollPeriod, EngineError>;

    async fn find_period(&self, id: Uuid) -> Result<PayrollPeriod, EngineError>;

    async fn save_period(&self, period: &PayrollPeriod) -> Result<(), EngineError>;
}
