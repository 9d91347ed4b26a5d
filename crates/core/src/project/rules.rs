//! Validation and normalization of project writes.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::error::ProjectError;
use super::types::{
    ProjectStatus, ProjectType, ReasonCategory, SalesStage, SphReleaseStatus, SphStatus,
    blank_as_none,
};
use crate::division::Division;
use crate::month::{YearMonth, parse_date};

/// One month of a submitted revenue plan.
#[derive(Debug, Clone, Deserialize)]
pub struct RevenuePlanDraft {
    /// Month as `YYYY-MM`.
    pub month: String,
    /// Planned revenue for the month.
    #[serde(default)]
    pub target_revenue: Decimal,
}

/// Project payload as submitted on create or update.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectDraft {
    /// Free-text description.
    pub description: String,
    /// Optional customer reference.
    #[serde(default)]
    pub customer_id: Option<i64>,
    /// Requested division; overridden for division-scoped callers.
    #[serde(default)]
    pub division: String,
    /// Commercial status.
    pub status: ProjectStatus,
    /// Revenue shape.
    pub project_type: ProjectType,
    /// Sales stage, defaults to 1.
    #[serde(default = "default_stage")]
    pub sales_stage: i32,
    /// SPH outcome.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub sph_status: Option<SphStatus>,
    /// SPH release date as `YYYY-MM-DD`.
    #[serde(default)]
    pub sph_release_date: Option<String>,
    /// Whether the SPH was released.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub sph_release_status: Option<SphReleaseStatus>,
    /// SPH document number.
    #[serde(default)]
    pub sph_number: Option<String>,
    /// Loss/Drop reason category.
    #[serde(default)]
    pub sph_status_reason_category: Option<String>,
    /// Loss/Drop reason note.
    #[serde(default)]
    pub sph_status_reason_note: Option<String>,
    /// Monthly revenue targets.
    #[serde(default)]
    pub revenue_plans: Vec<RevenuePlanDraft>,
}

const fn default_stage() -> i32 {
    1
}

/// A validated month of revenue plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedRevenue {
    /// Plan month.
    pub month: YearMonth,
    /// Target revenue, never negative.
    pub target_revenue: Decimal,
}

/// A project write that passed every rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedProject {
    /// Description, trimmed.
    pub description: String,
    /// Customer reference.
    pub customer_id: Option<i64>,
    /// Owning division.
    pub division: Division,
    /// Commercial status.
    pub status: ProjectStatus,
    /// Revenue shape.
    pub project_type: ProjectType,
    /// Sales stage after status adjustments.
    pub sales_stage: SalesStage,
    /// SPH outcome.
    pub sph_status: Option<SphStatus>,
    /// SPH release date.
    pub sph_release_date: Option<NaiveDate>,
    /// SPH release flag.
    pub sph_release_status: SphReleaseStatus,
    /// SPH document number.
    pub sph_number: Option<String>,
    /// Reason category, only for Loss/Drop.
    pub reason_category: Option<ReasonCategory>,
    /// Reason note, only for Loss/Drop.
    pub reason_note: Option<String>,
    /// Monthly targets, unique by month.
    pub revenue_plans: Vec<PlannedRevenue>,
}

impl ProjectDraft {
    /// Applies every project rule for the already-resolved `division`.
    ///
    /// - `New Recurring` requires status `New Prospect`.
    /// - Status `Carry Over` forces the closing stage.
    /// - Loss/Drop require a reason; `Other` also needs a note. Other SPH
    ///   statuses drop any reason.
    ///
    /// # Errors
    ///
    /// Returns the first `ProjectError` encountered.
    pub fn validate(self, division: Division) -> Result<ValidatedProject, ProjectError> {
        let description = self.description.trim().to_string();
        if description.is_empty() {
            return Err(ProjectError::Required("description"));
        }

        if self.project_type == ProjectType::NewRecurring
            && self.status != ProjectStatus::NewProspect
        {
            return Err(ProjectError::NewRecurringRequiresNewProspect);
        }

        let sales_stage = if self.status == ProjectStatus::CarryOver {
            SalesStage::CLOSING
        } else {
            SalesStage::new(self.sales_stage)?
        };

        let (reason_category, reason_note) = resolve_reason(
            self.sph_status,
            self.sph_status_reason_category.as_deref(),
            self.sph_status_reason_note.as_deref(),
        )?;

        let sph_release_date = non_blank(self.sph_release_date.as_deref())
            .map(parse_date)
            .transpose()?;

        let revenue_plans = validate_plans(&self.revenue_plans)?;

        Ok(ValidatedProject {
            description,
            customer_id: self.customer_id,
            division,
            status: self.status,
            project_type: self.project_type,
            sales_stage,
            sph_status: self.sph_status,
            sph_release_date,
            sph_release_status: self.sph_release_status.unwrap_or_default(),
            sph_number: non_blank(self.sph_number.as_deref()).map(str::to_string),
            reason_category,
            reason_note,
            revenue_plans,
        })
    }
}

fn resolve_reason(
    status: Option<SphStatus>,
    category: Option<&str>,
    note: Option<&str>,
) -> Result<(Option<ReasonCategory>, Option<String>), ProjectError> {
    if !status.is_some_and(SphStatus::requires_reason) {
        return Ok((None, None));
    }

    let raw = non_blank(category).ok_or(ProjectError::MissingReasonCategory)?;
    let category = ReasonCategory::parse(raw)
        .ok_or_else(|| ProjectError::InvalidReasonCategory(raw.to_string()))?;
    let note = non_blank(note).map(str::to_string);

    if category == ReasonCategory::Other && note.is_none() {
        return Err(ProjectError::MissingReasonNote);
    }
    Ok((Some(category), note))
}

/// Validates revenue plan months and targets.
///
/// # Errors
///
/// Returns `ProjectError` for bad months, negative targets, or repeated months.
pub fn validate_plans(plans: &[RevenuePlanDraft]) -> Result<Vec<PlannedRevenue>, ProjectError> {
    let mut seen = HashSet::with_capacity(plans.len());
    plans
        .iter()
        .map(|plan| {
            let month = YearMonth::parse(&plan.month)?;
            if plan.target_revenue < Decimal::ZERO {
                return Err(ProjectError::NegativeTarget);
            }
            if !seen.insert(month) {
                return Err(ProjectError::DuplicateMonth(month.to_string()));
            }
            Ok(PlannedRevenue {
                month,
                target_revenue: plan.target_revenue,
            })
        })
        .collect()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Formats a human-readable project code, e.g. `PRJ-ITS-2025-0007`.
#[must_use]
pub fn format_project_code(division: Division, year: i32, sequence: i32) -> String {
    format!("PRJ-{}-{year}-{sequence:04}", division.code())
}
