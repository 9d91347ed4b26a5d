//! Sort options for project listings.

/// Whitelisted sort columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    /// Project ID.
    #[default]
    Id,
    /// Project code.
    Code,
    /// Division.
    Division,
    /// Status.
    Status,
    /// Project type.
    Type,
    /// Total target revenue.
    Revenue,
    /// Total realization.
    Realization,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

/// Sort order for project listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProjectSort {
    /// Column.
    pub field: SortField,
    /// Direction.
    pub direction: SortDirection,
}

impl ProjectSort {
    /// Parses query values; unknown values fall back to `id desc`.
    #[must_use]
    pub fn parse(sort_by: Option<&str>, sort_dir: Option<&str>) -> Self {
        let field = match sort_by.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("code") => SortField::Code,
            Some("division") => SortField::Division,
            Some("status") => SortField::Status,
            Some("type") => SortField::Type,
            Some("revenue") => SortField::Revenue,
            Some("realization") => SortField::Realization,
            _ => SortField::Id,
        };
        let direction = match sort_dir.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        };
        Self { field, direction }
    }
}
