//! Computed payroll rows, full breakdown kept in `detail`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payroll_record")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub payroll_period_id: Uuid,
    pub employee_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub division: String,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub gross_pay: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub total_deductions: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub net_pay: Decimal,
    #[sea_orm(column_type = "JsonBinary")]
    pub detail: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Employee,
    #[sea_orm(
        belongs_to = "super::payroll_period::Entity",
        from = "Column::PayrollPeriodId",
        to = "super::payroll_period::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    PayrollPeriod,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::payroll_period::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PayrollPeriod.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
