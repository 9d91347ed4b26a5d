//! `SeaORM` Entity for project_postpo_monitoring table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "project_postpo_monitoring")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub project_id: i64,
    pub stage1_status: String,
    pub stage1_date: Option<Date>,
    pub stage1_note: Option<String>,
    pub stage2_status: String,
    pub stage2_date: Option<Date>,
    pub stage2_note: Option<String>,
    pub stage3_status: String,
    pub stage3_date: Option<Date>,
    pub stage3_note: Option<String>,
    pub stage4_status: String,
    pub stage4_date: Option<Date>,
    pub stage4_note: Option<String>,
    pub stage5_status: String,
    pub stage5_date: Option<Date>,
    pub stage5_note: Option<String>,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id",
        on_delete = "Cascade"
    )]
    Projects,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
