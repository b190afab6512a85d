//! Postgres enum types shared by the payroll tables.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "allowance_type")]
pub enum AllowanceType {
    #[sea_orm(string_value = "housing")]
    Housing,
    #[sea_orm(string_value = "meal")]
    Meal,
    #[sea_orm(string_value = "other")]
    Other,
    #[sea_orm(string_value = "position")]
    Position,
    #[sea_orm(string_value = "skill")]
    Skill,
    #[sea_orm(string_value = "transport")]
    Transport,
}
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "attendance_status")]
pub enum AttendanceStatus {
    #[sea_orm(string_value = "absent")]
    Absent,
    #[sea_orm(string_value = "late")]
    Late,
    #[sea_orm(string_value = "leave")]
    Leave,
    #[sea_orm(string_value = "present")]
    Present,
    #[sea_orm(string_value = "sick")]
    Sick,
}
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "bpjs_program")]
pub enum BpjsProgram {
    #[sea_orm(string_value = "health")]
    Health,
    #[sea_orm(string_value = "jht")]
    Jht,
    #[sea_orm(string_value = "jkk")]
    Jkk,
    #[sea_orm(string_value = "jkm")]
    Jkm,
    #[sea_orm(string_value = "jp")]
    Jp,
}
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "holiday_type")]
pub enum HolidayType {
    #[sea_orm(string_value = "company")]
    Company,
    #[sea_orm(string_value = "national")]
    National,
    #[sea_orm(string_value = "regional")]
    Regional,
}
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "period_status")]
pub enum PeriodStatus {
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "finalized")]
    Finalized,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "processing")]
    Processing,
}
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "worker_type")]
pub enum WorkerType {
    #[sea_orm(string_value = "harvester")]
    Harvester,
    #[sea_orm(string_value = "staff")]
    Staff,
}
