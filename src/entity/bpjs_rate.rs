//! `bpjs_rate` table.

use super::sea_orm_active_enums::BpjsProgram;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bpjs_rate")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub program: BpjsProgram,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub employee_rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub employer_rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))", nullable)]
    pub salary_cap: Option<Decimal>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
