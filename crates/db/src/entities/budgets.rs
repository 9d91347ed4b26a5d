//! `SeaORM` Entity for budgets table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub division: String,
    pub month: Date,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub budget_amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::budget_realization::Entity")]
    BudgetRealization,
}

impl Related<super::budget_realization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetRealization.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
