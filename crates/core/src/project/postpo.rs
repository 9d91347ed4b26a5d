//! Post-PO execution monitoring.
//!
//! Once a deal closes, delivery is tracked through five fixed stages. Each
//! stage carries a status, an optional date, and an optional note.

use chrono::NaiveDate;
use serde::Deserialize;

use super::error::ProjectError;
use super::types::{SalesStage, blank_as_none};
use crate::month::parse_date;

wire_enum! {
    /// Progress of one post-PO stage.
    #[derive(Default)]
    PostPoStatus {
        /// Not yet begun.
        #[default]
        NotStarted => "Not Started",
        /// Under way.
        InProgress => "In Progress",
        /// Finished.
        Done => "Done",
    }
}

const STAGE_TITLES: [&str; 5] = [
    "Order Confirmation & Planning",
    "Procurement & Delivery Execution",
    "Implementation",
    "Goods Receipt / Service Acceptance",
    "Invoice Submission",
];

/// One of the five post-PO stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PostPoStage(u8);

impl PostPoStage {
    /// Validates a raw stage number.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::InvalidPostPoStage` outside 1 to 5.
    pub fn new(value: i32) -> Result<Self, ProjectError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (1..=5).contains(v))
            .map(Self)
            .ok_or(ProjectError::InvalidPostPoStage)
    }

    /// Stage number.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Stage title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        STAGE_TITLES[(self.0 - 1) as usize]
    }
}

/// Stage update as submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct PostPoUpdateDraft {
    /// Stage number, 1 to 5.
    pub stage: i32,
    /// New status.
    pub status: PostPoStatus,
    /// Optional completion date `YYYY-MM-DD`.
    #[serde(default)]
    pub date: Option<String>,
    /// Optional note.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub note: Option<String>,
}

/// A validated stage update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPoUpdate {
    /// Target stage.
    pub stage: PostPoStage,
    /// New status.
    pub status: PostPoStatus,
    /// Optional date.
    pub date: Option<NaiveDate>,
    /// Optional note.
    pub note: Option<String>,
}

impl PostPoUpdateDraft {
    /// Validates the update against the project's current sales stage.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::NotClosed` when the project has not reached the
    /// closing stage, or a validation error for a bad stage or date.
    pub fn validate(self, sales_stage: i32) -> Result<PostPoUpdate, ProjectError> {
        if !SalesStage::new(sales_stage).is_ok_and(SalesStage::is_closing) {
            return Err(ProjectError::NotClosed);
        }
        let stage = PostPoStage::new(self.stage)?;
        let date = self
            .date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(parse_date)
            .transpose()?;

        Ok(PostPoUpdate {
            stage,
            status: self.status,
            date,
            note: self.note,
        })
    }
}

/// True when all five stages are `Done`.
#[must_use]
pub fn is_completed(statuses: &[PostPoStatus; 5]) -> bool {
    statuses.iter().all(|s| *s == PostPoStatus::Done)
}

/// Latest stage that has started, e.g. `Stage 3 - In Progress`.
#[must_use]
pub fn last_status_label(statuses: &[PostPoStatus; 5]) -> String {
    statuses
        .iter()
        .enumerate()
        .rev()
        .find(|(_, s)| **s != PostPoStatus::NotStarted)
        .map_or_else(
            || format!("Stage 1 - {}", PostPoStatus::NotStarted),
            |(idx, status)| format!("Stage {} - {status}", idx + 1),
        )
}
