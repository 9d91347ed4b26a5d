//! Dashboard query filters.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::access::{AccessError, Caller};
use crate::division::is_all;
use crate::month::{FiscalRange, MonthError};

/// Raw dashboard query string.
///
/// `status`, `sales_stage` and `project_type` may repeat.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    /// Project statuses.
    #[serde(default)]
    pub status: Vec<String>,
    /// Sales stages as strings; non-numeric values are dropped.
    #[serde(default)]
    pub sales_stage: Vec<String>,
    /// Project types.
    #[serde(default)]
    pub project_type: Vec<String>,
    /// Division (ignored for division-scoped callers).
    #[serde(default)]
    pub division: Option<String>,
    /// Customer name.
    #[serde(default)]
    pub customer: Option<String>,
    /// Range start, `YYYY-MM` or `YYYY-MM-DD`.
    #[serde(default)]
    pub from: Option<String>,
    /// Range end, `YYYY-MM` or `YYYY-MM-DD`.
    #[serde(default)]
    pub to: Option<String>,
}

/// Errors raised while resolving dashboard filters.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FilterError {
    /// Caller scope could not be resolved.
    #[error(transparent)]
    Access(#[from] AccessError),
    /// `from`/`to` could not be resolved.
    #[error(transparent)]
    Month(#[from] MonthError),
}

impl From<FilterError> for salesdesk_shared::AppError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::Access(e) => e.into(),
            FilterError::Month(e) => e.into(),
        }
    }
}

/// Filter over projects joined to their revenue plan rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFilter {
    /// Canonical division, `None` for all divisions.
    pub division: Option<String>,
    /// Statuses to include; empty means all.
    pub statuses: Vec<String>,
    /// Sales stages to include; empty means all.
    pub sales_stages: Vec<i32>,
    /// Project types to include; empty means all.
    pub project_types: Vec<String>,
    /// Customer name.
    pub customer: Option<String>,
    /// Revenue plan month range.
    pub range: FiscalRange,
}

impl ProjectFilter {
    /// Resolves a project filter for `caller`.
    ///
    /// # Errors
    ///
    /// Fails when the caller scope is invalid or `from`/`to` cannot be parsed.
    pub fn resolve(
        query: &DashboardQuery,
        caller: &Caller,
        today: NaiveDate,
    ) -> Result<Self, FilterError> {
        let division = caller.scoped_division(query.division.as_deref())?;
        let range = FiscalRange::resolve(query.from.as_deref(), query.to.as_deref(), today)?;

        Ok(Self {
            division,
            statuses: multi_value(&query.status),
            sales_stages: multi_value(&query.sales_stage)
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect(),
            project_types: multi_value(&query.project_type),
            customer: query
                .customer
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty() && !is_all(c))
                .map(str::to_string),
            range,
        })
    }
}

/// Filter over division budgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetFilter {
    /// Canonical division, `None` for all divisions.
    pub division: Option<String>,
    /// Budget month range.
    pub range: FiscalRange,
}

impl BudgetFilter {
    /// Resolves a budget filter for `caller`.
    ///
    /// # Errors
    ///
    /// Fails when the caller scope is invalid or `from`/`to` cannot be parsed.
    pub fn resolve(
        query: &DashboardQuery,
        caller: &Caller,
        today: NaiveDate,
    ) -> Result<Self, FilterError> {
        Ok(Self {
            division: caller.scoped_division(query.division.as_deref())?,
            range: FiscalRange::resolve(query.from.as_deref(), query.to.as_deref(), today)?,
        })
    }
}

/// Trims values and drops blanks; a lone `ALL` clears the filter.
fn multi_value(values: &[String]) -> Vec<String> {
    if let [only] = values
        && is_all(only.trim())
    {
        return Vec::new();
    }
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserRole;
    use rstest::rstest;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn admin() -> Caller {
        Caller::new(1, UserRole::Admin, "")
    }

    fn netco_user() -> Caller {
        Caller::new(2, UserRole::User, "net co")
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_empty_query_defaults_to_current_year() {
        let filter = ProjectFilter::resolve(&DashboardQuery::default(), &admin(), today()).unwrap();

        assert_eq!(filter.division, None);
        assert!(filter.statuses.is_empty());
        assert_eq!(filter.range, FiscalRange::year(2025));
    }

    #[rstest]
    #[case(&["ALL"], &[])]
    #[case(&["all"], &[])]
    #[case(&["Prospect", "Carry Over"], &["Prospect", "Carry Over"])]
    #[case(&["Prospect", "ALL"], &["Prospect", "ALL"])]
    fn test_multi_value_all_sentinel(#[case] input: &[&str], #[case] expected: &[&str]) {
        assert_eq!(multi_value(&strings(input)), strings(expected));
    }

    #[test]
    fn test_non_numeric_stages_are_dropped() {
        let query = DashboardQuery {
            sales_stage: strings(&["1", "x", "6"]),
            ..DashboardQuery::default()
        };
        let filter = ProjectFilter::resolve(&query, &admin(), today()).unwrap();
        assert_eq!(filter.sales_stages, vec![1, 6]);
    }

    #[test]
    fn test_user_division_overrides_query() {
        let query = DashboardQuery {
            division: Some("IT Solutions".into()),
            ..DashboardQuery::default()
        };
        let filter = ProjectFilter::resolve(&query, &netco_user(), today()).unwrap();
        assert_eq!(filter.division.as_deref(), Some("NetCo"));

        let budget = BudgetFilter::resolve(&query, &netco_user(), today()).unwrap();
        assert_eq!(budget.division.as_deref(), Some("NetCo"));
    }

    #[test]
    fn test_admin_division_is_normalized() {
        let query = DashboardQuery {
            division: Some("itsol".into()),
            customer: Some("ALL".into()),
            ..DashboardQuery::default()
        };
        let filter = ProjectFilter::resolve(&query, &admin(), today()).unwrap();
        assert_eq!(filter.division.as_deref(), Some("IT Solutions"));
        assert_eq!(filter.customer, None);
    }

    #[test]
    fn test_invalid_range_is_rejected() {
        let query = DashboardQuery {
            from: Some("2025-13".into()),
            ..DashboardQuery::default()
        };
        assert!(matches!(
            BudgetFilter::resolve(&query, &admin(), today()),
            Err(FilterError::Month(_))
        ));
    }

    #[test]
    fn test_user_without_division_is_forbidden() {
        let caller = Caller::new(3, UserRole::User, "  ");
        assert_eq!(
            ProjectFilter::resolve(&DashboardQuery::default(), &caller, today()),
            Err(FilterError::Access(AccessError::MissingDivision))
        );
    }
}
