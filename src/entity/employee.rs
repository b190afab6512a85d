//! `employee` table.

use super::sea_orm_active_enums::WorkerType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "employee")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    #[sea_orm(column_type = "Text")]
    pub full_name: String,
    #[sea_orm(column_type = "Text")]
    pub division: String,
    #[sea_orm(column_type = "Text")]
    pub position: String,
    pub worker_type: WorkerType,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub base_salary: Decimal,
    #[sea_orm(column_type = "Text", nullable)]
    pub npwp: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub ptkp_code: String,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::attendance_record::Entity")]
    AttendanceRecord,
    #[sea_orm(has_many = "super::employee_allowance::Entity")]
    EmployeeAllowance,
    #[sea_orm(has_many = "super::payroll_record::Entity")]
    PayrollRecord,
    #[sea_orm(has_many = "super::period_input::Entity")]
    PeriodInput,
}

impl Related<super::attendance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttendanceRecord.def()
    }
}

impl Related<super::employee_allowance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeAllowance.def()
    }
}

impl Related<super::payroll_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PayrollRecord.def()
    }
}

impl Related<super::period_input::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PeriodInput.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
