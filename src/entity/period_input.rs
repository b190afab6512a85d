//! Per-employee figures captured for a payroll month.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "period_input")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub employee_id: Uuid,
    pub year: i32,
    pub month: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 3)))")]
    pub tonnage: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub other_income: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub loan: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub misc_deduction: Decimal,
    pub annualization_months: Option<i16>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Employee,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
