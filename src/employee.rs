use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::deduction::PtkpCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerType {
    #[default]
    Staff,
    /// Paid a production premium on harvested tonnage
    Harvester,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowanceKind {
    Position,
    Skill,
    Transport,
    Meal,
    Housing,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allowance {
    pub kind: AllowanceKind,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub full_name: String,
    pub division: String,
    pub position: String,
    pub worker_type: WorkerType,
    pub base_salary: Decimal,
    pub npwp: Option<String>,
    pub ptkp_code: PtkpCode,
    #[serde(default)]
    pub allowances: Vec<Allowance>,
}

/// Per-period figures that are not attendance: harvest, extra income, loan instalments.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeriodInputs {
    #[serde(default)]
    pub tonnage: Decimal,
    #[serde(default)]
    pub other_income: Decimal,
    #[serde(default)]
    pub loan: Decimal,
    #[serde(default)]
    pub misc_deduction: Decimal,
    /// Months the employee is taxed over this year, for partial-year employees
    #[serde(default)]
    pub annualization_months: Option<u8>,
}
