//! `payroll_period` table.

use super::sea_orm_active_enums::PeriodStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payroll_period")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub year: i32,
    pub month: i32,
    pub status: PeriodStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub failure_reason: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payroll_record::Entity")]
    PayrollRecord,
}

impl Related<super::payroll_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PayrollRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
