//! Sales projects: classification, write rules, post-PO tracking, sorting.

#[macro_use]
mod types;

pub mod error;
pub mod postpo;
pub mod rules;
pub mod sort;


pub use error::ProjectError;
pub use postpo::{
    PostPoStage, PostPoStatus, PostPoUpdate, PostPoUpdateDraft, is_completed, last_status_label,
};
pub use rules::{
    PlannedRevenue, ProjectDraft, RevenuePlanDraft, ValidatedProject, format_project_code,
    validate_plans,
};
pub use sort::{ProjectSort, SortDirection, SortField};
pub use types::{
    ProjectStatus, ProjectType, ReasonCategory, SalesStage, SphReleaseStatus, SphStatus,
    stage_text,
};
