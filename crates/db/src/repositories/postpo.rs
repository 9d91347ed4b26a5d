//! Post-PO monitoring repository.

use chrono::NaiveDate;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait, Set, Statement,
    TransactionTrait, prelude::DateTimeWithTimeZone, sea_query::OnConflict,
};
use serde::Serialize;

use salesdesk_core::project::{PostPoStatus, PostPoUpdate};

use crate::entities::project_postpo_monitoring;

/// Status, date and note of one stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageProgress {
    pub status: PostPoStatus,
    pub date: Option<NaiveDate>,
    pub note: Option<String>,
}

/// Monitoring state of a project's five post-PO stages.
///
/// Serializes to the flat `stageN_status` / `stageN_date` / `stageN_note`
/// layout clients read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPoMonitoring {
    pub project_id: i64,
    pub stages: [StageProgress; 5],
    /// `None` until the first update is stored.
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl PostPoMonitoring {
    /// All stages not started.
    #[must_use]
    pub fn not_started(project_id: i64) -> Self {
        Self {
            project_id,
            stages: Default::default(),
            updated_at: None,
        }
    }
}

impl Serialize for PostPoMonitoring {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("project_id", &self.project_id)?;
        for (idx, stage) in self.stages.iter().enumerate() {
            let n = idx + 1;
            map.serialize_entry(&format!("stage{n}_status"), &stage.status)?;
            if let Some(date) = stage.date {
                map.serialize_entry(&format!("stage{n}_date"), &date)?;
            }
            if let Some(note) = &stage.note {
                map.serialize_entry(&format!("stage{n}_note"), note)?;
            }
        }
        map.serialize_entry("updated_at", &self.updated_at)?;
        map.end()
    }
}

fn status(raw: &str) -> PostPoStatus {
    PostPoStatus::parse(raw).unwrap_or_default()
}

impl From<project_postpo_monitoring::Model> for PostPoMonitoring {
    fn from(m: project_postpo_monitoring::Model) -> Self {
        Self {
            project_id: m.project_id,
            stages: [
                StageProgress {
                    status: status(&m.stage1_status),
                    date: m.stage1_date,
                    note: m.stage1_note,
                },
                StageProgress {
                    status: status(&m.stage2_status),
                    date: m.stage2_date,
                    note: m.stage2_note,
                },
                StageProgress {
                    status: status(&m.stage3_status),
                    date: m.stage3_date,
                    note: m.stage3_note,
                },
                StageProgress {
                    status: status(&m.stage4_status),
                    date: m.stage4_date,
                    note: m.stage4_note,
                },
                StageProgress {
                    status: status(&m.stage5_status),
                    date: m.stage5_date,
                    note: m.stage5_note,
                },
            ],
            updated_at: Some(m.updated_at),
        }
    }
}

/// `UPDATE` for one stage; the stage number is already bounded to 1..=5.
fn stage_update_sql(stage: u8) -> String {
    format!(
        "UPDATE project_postpo_monitoring \
         SET stage{stage}_status = $1, stage{stage}_date = $2, stage{stage}_note = $3, \
             updated_at = now() \
         WHERE project_id = $4"
    )
}

/// Post-PO monitoring repository.
#[derive(Debug, Clone)]
pub struct PostPoRepository {
    db: DatabaseConnection,
}

impl PostPoRepository {
    /// Creates a new post-PO repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads monitoring state; a project without a row reads as not started.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, project_id: i64) -> Result<PostPoMonitoring, DbErr> {
        Ok(project_postpo_monitoring::Entity::find_by_id(project_id)
            .one(&self.db)
            .await?
            .map_or_else(|| PostPoMonitoring::not_started(project_id), Into::into))
    }

    /// Stores one stage's status, date and note, creating the row first if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database transaction fails.
    pub async fn update_stage(
        &self,
        project_id: i64,
        update: &PostPoUpdate,
    ) -> Result<PostPoMonitoring, DbErr> {
        let txn = self.db.begin().await?;

        let not_started = PostPoStatus::NotStarted.as_str().to_owned();
        project_postpo_monitoring::Entity::insert(project_postpo_monitoring::ActiveModel {
            project_id: Set(project_id),
            stage1_status: Set(not_started.clone()),
            stage2_status: Set(not_started.clone()),
            stage3_status: Set(not_started.clone()),
            stage4_status: Set(not_started.clone()),
            stage5_status: Set(not_started),
            updated_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::column(project_postpo_monitoring::Column::ProjectId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

        txn.execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
            stage_update_sql(update.stage.value()),
            [
                update.status.as_str().into(),
                update.date.into(),
                update.note.clone().into(),
                project_id.into(),
            ],
        ))
        .await?;

        let stored = project_postpo_monitoring::Entity::find_by_id(project_id)
            .one(&txn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("project_postpo_monitoring".to_string()))?;

        txn.commit().await?;

        tracing::info!(
            project_id = %project_id,
            stage = update.stage.value(),
            status = %update.status,
            "Post-PO stage updated"
        );
        Ok(stored.into())
    }
}
