//! Project validation errors.

use salesdesk_shared::AppError;
use thiserror::Error;

use crate::month::MonthError;

/// Project rule violations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectError {
    /// Sales stage outside 1 to 6.
    #[error("sales_stage must be between 1 and 6")]
    InvalidSalesStage,

    /// `New Recurring` used with a status other than `New Prospect`.
    #[error("project type New Recurring is only allowed for status New Prospect")]
    NewRecurringRequiresNewProspect,

    /// Loss/Drop without a reason category.
    #[error("sph_status_reason_category is required when SPH status is Loss or Drop")]
    MissingReasonCategory,

    /// Reason category not recognized.
    #[error("invalid sph_status_reason_category: {0}")]
    InvalidReasonCategory(String),

    /// Category `Other` without a note.
    #[error("sph_status_reason_note is required when reason category is Other")]
    MissingReasonNote,

    /// Required text field left blank.
    #[error("{0} is required")]
    Required(&'static str),

    /// Negative revenue target.
    #[error("target_revenue must not be negative")]
    NegativeTarget,

    /// Same month listed twice in one revenue plan.
    #[error("duplicate revenue plan month: {0}")]
    DuplicateMonth(String),

    /// Post-PO stage outside 1 to 5.
    #[error("stage must be between 1 and 5")]
    InvalidPostPoStage,

    /// Post-PO monitoring before the deal is closed.
    #[error("post-PO monitoring requires sales stage 6")]
    NotClosed,

    /// Bad month or date value.
    #[error(transparent)]
    Month(#[from] MonthError),
}

impl From<ProjectError> for AppError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::NotClosed => Self::BusinessRule(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}
