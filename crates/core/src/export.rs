//! Project CSV export: filter resolution and row layout.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use salesdesk_shared::AppError;
use serde::Deserialize;
use thiserror::Error;

use crate::access::{AccessError, Caller};
use crate::division::is_all;
use crate::month::{MonthError, YearMonth};
use crate::project::{PostPoStatus, last_status_label, stage_text};

/// Earliest exportable year.
pub const MIN_YEAR: i32 = 2000;
/// Latest exportable year.
pub const MAX_YEAR: i32 = 2100;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Export failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    /// `year` is not a number in range.
    #[error("invalid year: must be between {MIN_YEAR} and {MAX_YEAR}")]
    InvalidYear,

    /// Caller scope could not be resolved.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// `start_month`/`end_month` is not `YYYY-MM`.
    #[error(transparent)]
    Month(#[from] MonthError),
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Access(e) => e.into(),
            ExportError::Month(e) => e.into(),
            ExportError::InvalidYear => Self::Validation(err.to_string()),
        }
    }
}

/// Raw export query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExportQuery {
    /// Export year.
    pub year: Option<String>,
    /// Division (admins only).
    pub division: Option<String>,
    /// Customer ID.
    pub customer_id: Option<String>,
    /// Project status.
    pub status: Option<String>,
    /// `Yes`/`No`.
    pub sph_released: Option<String>,
    /// Project type.
    pub project_type: Option<String>,
    /// Sales stage.
    pub sales_stage: Option<String>,
    /// `pipeline` keeps stages 1..=5.
    pub card_mode: Option<String>,
    /// SPH status bucket.
    pub sph_status: Option<String>,
    /// `completed` or `in_execution`.
    pub execution: Option<String>,
    /// Search over code and description.
    pub q: Option<String>,
    /// `YYYY-MM` lower bound.
    pub start_month: Option<String>,
    /// `YYYY-MM` upper bound.
    pub end_month: Option<String>,
}

/// Post-PO execution filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionFilter {
    /// All five stages done.
    Completed,
    /// Monitoring started but not all stages done.
    InExecution,
}

/// Resolved export filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFilter {
    /// Year whose months are spread into columns.
    pub year: i32,
    /// Canonical division, `None` for all.
    pub division: Option<String>,
    /// Customer ID.
    pub customer_id: Option<i64>,
    /// Project status.
    pub status: Option<String>,
    /// `Yes` or `No`.
    pub sph_released: Option<String>,
    /// Project type.
    pub project_type: Option<String>,
    /// Sales stage.
    pub sales_stage: Option<i32>,
    /// Restrict to stages 1..=5.
    pub pipeline_only: bool,
    /// SPH status bucket; `Open` also covers unset values.
    pub sph_status: Option<String>,
    /// Post-PO execution state.
    pub execution: Option<ExecutionFilter>,
    /// `ILIKE` pattern over code and description.
    pub search: Option<String>,
    /// Projects whose plans reach at least this month.
    pub start_month: Option<NaiveDate>,
    /// Projects whose plans start at most this month.
    pub end_month: Option<NaiveDate>,
}

impl ExportFilter {
    /// Resolves an export filter for `caller`.
    ///
    /// Unparsable optional filters (customer, stage) are ignored; a bad
    /// year or month is rejected.
    ///
    /// # Errors
    ///
    /// Returns `ExportError` for an out-of-range year, a bad month bound or
    /// an invalid caller scope.
    pub fn resolve(
        query: &ExportQuery,
        caller: &Caller,
        today: NaiveDate,
    ) -> Result<Self, ExportError> {
        let year = match present(query.year.as_ref()) {
            None => today.year(),
            Some(raw) => raw
                .parse::<i32>()
                .ok()
                .filter(|y| (MIN_YEAR..=MAX_YEAR).contains(y))
                .ok_or(ExportError::InvalidYear)?,
        };

        let month_bound = |value: Option<&String>| -> Result<Option<NaiveDate>, MonthError> {
            present(value)
                .map(|m| YearMonth::parse(m).map(YearMonth::first_day))
                .transpose()
        };

        Ok(Self {
            year,
            division: caller.scoped_division(query.division.as_deref())?,
            customer_id: selected(query.customer_id.as_ref()).and_then(|v| v.parse().ok()),
            status: selected(query.status.as_ref()).map(str::to_string),
            sph_released: selected(query.sph_released.as_ref()).map(str::to_string),
            project_type: selected(query.project_type.as_ref()).map(str::to_string),
            sales_stage: selected(query.sales_stage.as_ref()).and_then(|v| v.parse().ok()),
            pipeline_only: present(query.card_mode.as_ref()) == Some("pipeline"),
            sph_status: selected(query.sph_status.as_ref()).map(str::to_string),
            execution: match present(query.execution.as_ref()) {
                Some("completed") => Some(ExecutionFilter::Completed),
                Some("in_execution") => Some(ExecutionFilter::InExecution),
                _ => None,
            },
            search: present(query.q.as_ref()).map(like_pattern),
            start_month: month_bound(query.start_month.as_ref())?,
            end_month: month_bound(query.end_month.as_ref())?,
        })
    }

    /// First day of the export year.
    #[must_use]
    pub fn year_start(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, 1, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Download file name.
    #[must_use]
    pub fn filename(&self) -> String {
        format!("projects_export_{}.csv", self.year)
    }
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn selected(value: Option<&String>) -> Option<&str> {
    present(value).filter(|v| !is_all(v))
}

/// Wraps a search term for `ILIKE`, escaping wildcards.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Joins reason category and note as `category: note`, or whichever is set.
#[must_use]
pub fn format_reason(category: &str, note: &str) -> String {
    match (category.trim(), note.trim()) {
        ("", note) => note.to_string(),
        (category, "") => category.to_string(),
        (category, note) => format!("{category}: {note}"),
    }
}

/// CSV header row.
#[must_use]
pub fn csv_headers() -> Vec<String> {
    let mut headers: Vec<String> = [
        "Code",
        "Descriptions",
        "Divisi",
        "Customer",
        "Type",
        "Status",
        "Stage",
        "Post PO Last Status",
        "SPH Release?",
        "SPH Status",
        "Reason",
        "Total Revenue",
        "Total Realization",
    ]
    .iter()
    .map(ToString::to_string)
    .collect();

    for prefix in ["(Target) ", "(Realization) "] {
        for (i, name) in MONTH_NAMES.iter().enumerate() {
            if i == 0 {
                headers.push(format!("{prefix}{name}"));
            } else {
                headers.push((*name).to_string());
            }
        }
    }
    headers
}

/// One exported project with its yearly spread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    /// Project code.
    pub project_code: String,
    /// Description.
    pub description: String,
    /// Division.
    pub division: String,
    /// Customer name, empty when unset.
    pub customer: String,
    /// Project type.
    pub project_type: String,
    /// Project status.
    pub status: String,
    /// Raw sales stage.
    pub sales_stage: i32,
    /// Post-PO statuses, stage 1 first.
    pub post_po: [PostPoStatus; 5],
    /// `Yes`/`No`.
    pub sph_release_status: String,
    /// SPH status, empty when unset.
    pub sph_status: String,
    /// SPH reason category.
    pub reason_category: String,
    /// SPH reason note.
    pub reason_note: String,
    /// Year target total.
    pub total_revenue: Decimal,
    /// Year realization total.
    pub total_realization: Decimal,
    /// Monthly targets, January first.
    pub targets: [Decimal; 12],
    /// Monthly realization, January first.
    pub realizations: [Decimal; 12],
}

impl ExportRow {
    /// Renders the row in header order.
    #[must_use]
    pub fn to_record(&self) -> Vec<String> {
        let mut record = vec![
            self.project_code.clone(),
            self.description.clone(),
            self.division.clone(),
            self.customer.clone(),
            self.project_type.clone(),
            self.status.clone(),
            stage_text(self.sales_stage),
            last_status_label(&self.post_po),
            self.sph_release_status.clone(),
            self.sph_status.clone(),
            format_reason(&self.reason_category, &self.reason_note),
            self.total_revenue.to_string(),
            self.total_realization.to_string(),
        ];
        record.extend(self.targets.iter().map(ToString::to_string));
        record.extend(self.realizations.iter().map(ToString::to_string));
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserRole;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn admin() -> Caller {
        Caller::new(1, UserRole::Admin, "")
    }

    #[test]
    fn test_defaults() {
        let filter = ExportFilter::resolve(&ExportQuery::default(), &admin(), today()).unwrap();

        assert_eq!(filter.year, 2025);
        assert_eq!(filter.filename(), "projects_export_2025.csv");
        assert_eq!(filter.year_start(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert!(!filter.pipeline_only);
        assert_eq!(filter.execution, None);
    }

    #[rstest]
    #[case("1999")]
    #[case("2101")]
    #[case("twenty")]
    fn test_invalid_year(#[case] year: &str) {
        let query = ExportQuery {
            year: Some(year.into()),
            ..ExportQuery::default()
        };
        assert_eq!(
            ExportFilter::resolve(&query, &admin(), today()),
            Err(ExportError::InvalidYear)
        );
    }

    #[test]
    fn test_filters_are_parsed() {
        let query = ExportQuery {
            year: Some("2024".into()),
            division: Some("ALL".into()),
            customer_id: Some("12".into()),
            status: Some("ALL".into()),
            sales_stage: Some("abc".into()),
            card_mode: Some("pipeline".into()),
            execution: Some("in_execution".into()),
            q: Some("50%_off".into()),
            start_month: Some("2024-02".into()),
            ..ExportQuery::default()
        };
        let filter = ExportFilter::resolve(&query, &admin(), today()).unwrap();

        assert_eq!(filter.division, None);
        assert_eq!(filter.customer_id, Some(12));
        assert_eq!(filter.status, None);
        assert_eq!(filter.sales_stage, None);
        assert!(filter.pipeline_only);
        assert_eq!(filter.execution, Some(ExecutionFilter::InExecution));
        assert_eq!(filter.search.as_deref(), Some("%50\\%\\_off%"));
        assert_eq!(filter.start_month, NaiveDate::from_ymd_opt(2024, 2, 1));
    }

    #[test]
    fn test_bad_month_bound() {
        let query = ExportQuery {
            end_month: Some("2024/02".into()),
            ..ExportQuery::default()
        };
        assert!(matches!(
            ExportFilter::resolve(&query, &admin(), today()),
            Err(ExportError::Month(_))
        ));
    }

    #[test]
    fn test_user_is_pinned_to_division() {
        let caller = Caller::new(5, UserRole::User, "oil & gas");
        let query = ExportQuery {
            division: Some("NetCo".into()),
            ..ExportQuery::default()
        };
        let filter = ExportFilter::resolve(&query, &caller, today()).unwrap();
        assert_eq!(filter.division.as_deref(), Some("Oil Gas & Mining"));
    }

    #[rstest]
    #[case("Teknis", "late delivery", "Teknis: late delivery")]
    #[case("Administrasi", "", "Administrasi")]
    #[case("", "no budget", "no budget")]
    #[case("", "", "")]
    fn test_format_reason(#[case] category: &str, #[case] note: &str, #[case] expected: &str) {
        assert_eq!(format_reason(category, note), expected);
    }

    #[test]
    fn test_headers() {
        let headers = csv_headers();

        assert_eq!(headers.len(), 13 + 24);
        assert_eq!(headers[13], "(Target) January");
        assert_eq!(headers[14], "February");
        assert_eq!(headers[25], "(Realization) January");
        assert_eq!(headers[36], "December");
    }

    #[test]
    fn test_record_matches_headers() {
        let mut targets = [Decimal::ZERO; 12];
        targets[0] = dec!(100.00);
        let mut post_po = [PostPoStatus::NotStarted; 5];
        post_po[1] = PostPoStatus::InProgress;

        let row = ExportRow {
            project_code: "PRJ-ITS-2025-0001".into(),
            description: "Data center, phase 2".into(),
            division: "IT Solutions".into(),
            customer: "Acme".into(),
            project_type: "Project Based".into(),
            status: "Prospect".into(),
            sales_stage: 6,
            post_po,
            sph_release_status: "Yes".into(),
            sph_status: "Loss".into(),
            reason_category: "Other".into(),
            reason_note: "price".into(),
            total_revenue: dec!(100.00),
            total_realization: Decimal::ZERO,
            targets,
            realizations: [Decimal::ZERO; 12],
        };
        let record = row.to_record();

        assert_eq!(record.len(), csv_headers().len());
        assert_eq!(record[6], "6 - Closing");
        assert_eq!(record[7], "Stage 2 - In Progress");
        assert_eq!(record[10], "Other: price");
        assert_eq!(record[13], "100.00");
    }
}
