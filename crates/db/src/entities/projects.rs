//! `SeaORM` Entity for projects table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub project_code: String,
    pub description: String,
    pub customer_id: Option<i64>,
    pub division: String,
    pub status: String,
    pub project_type: String,
    pub sales_stage: i16,
    pub sph_status: Option<String>,
    pub sph_release_date: Option<Date>,
    pub sph_release_status: String,
    pub sph_number: Option<String>,
    pub sph_status_reason_category: Option<String>,
    pub sph_status_reason_note: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id",
        on_delete = "SetNull"
    )]
    Customers,
    #[sea_orm(has_many = "super::project_revenue_plan::Entity")]
    ProjectRevenuePlan,
    #[sea_orm(has_one = "super::project_postpo_monitoring::Entity")]
    ProjectPostpoMonitoring,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::project_revenue_plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectRevenuePlan.def()
    }
}

impl Related<super::project_postpo_monitoring::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectPostpoMonitoring.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
