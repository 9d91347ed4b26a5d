//! Parameterized SQL condition builder for reporting queries.
//!
//! User input never enters SQL text: every value is bound as a `$n`
//! placeholder and carried alongside the clause in [`SqlConditions::values`].

use sea_orm::Value;

use salesdesk_core::dashboard::{BudgetFilter, ProjectFilter};
use salesdesk_core::export::{ExecutionFilter, ExportFilter};

pub(crate) const ALL_POSTPO_DONE: &str = "(m.stage1_status = 'Done' AND m.stage2_status = 'Done' \
     AND m.stage3_status = 'Done' AND m.stage4_status = 'Done' AND m.stage5_status = 'Done')";

/// Accumulates `AND`-joined clauses and their bound values.
#[derive(Debug, Clone, Default)]
pub struct SqlConditions {
    clauses: Vec<String>,
    values: Vec<Value>,
    offset: usize,
}

impl SqlConditions {
    /// Creates an empty builder whose first placeholder is `$1`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty builder whose first placeholder is `$offset + 1`.
    #[must_use]
    pub fn starting_after(offset: usize) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }

    /// Binds a value and returns its placeholder.
    pub fn bind(&mut self, value: impl Into<Value>) -> String {
        self.values.push(value.into());
        format!("${}", self.offset + self.values.len())
    }

    /// Adds a clause without parameters.
    pub fn push_raw(&mut self, clause: impl Into<String>) {
        self.clauses.push(clause.into());
    }

    /// Adds `column = $n`.
    pub fn push_eq(&mut self, column: &str, value: impl Into<Value>) {
        let placeholder = self.bind(value);
        self.clauses.push(format!("{column} = {placeholder}"));
    }

    /// Adds `column <op> $n`.
    pub fn push_cmp(&mut self, column: &str, op: &str, value: impl Into<Value>) {
        let placeholder = self.bind(value);
        self.clauses.push(format!("{column} {op} {placeholder}"));
    }

    /// Adds `column IN ($n, ...)`; an empty list adds nothing.
    pub fn push_in<I, V>(&mut self, column: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let placeholders: Vec<String> = values.into_iter().map(|v| self.bind(v)).collect();
        if !placeholders.is_empty() {
            self.clauses
                .push(format!("{column} IN ({})", placeholders.join(", ")));
        }
    }

    /// The `AND`-joined clause, `1=1` when empty.
    #[must_use]
    pub fn clause(&self) -> String {
        if self.clauses.is_empty() {
            "1=1".to_string()
        } else {
            self.clauses.join(" AND ")
        }
    }

    /// Bound values in placeholder order.
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        self.values.clone()
    }

    /// Number of bound values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Conditions over `projects p`, `customers c` and `project_revenue_plan r`.
#[must_use]
pub fn project_conditions(filter: &ProjectFilter) -> SqlConditions {
    let mut conds = SqlConditions::new();
    push_project_scope(&mut conds, filter);
    conds.push_cmp("r.month", ">=", filter.range.from);
    conds.push_cmp("r.month", "<=", filter.range.to);
    conds
}

fn push_project_scope(conds: &mut SqlConditions, filter: &ProjectFilter) {
    conds.push_in("p.status", filter.statuses.iter().cloned());
    conds.push_in("p.sales_stage", filter.sales_stages.iter().copied());
    conds.push_in("p.project_type", filter.project_types.iter().cloned());
    if let Some(division) = &filter.division {
        conds.push_eq("p.division", division.clone());
    }
    if let Some(customer) = &filter.customer {
        conds.push_eq("COALESCE(c.name, '')", customer.clone());
    }
}

/// Conditions over `budgets b`.
#[must_use]
pub fn budget_conditions(filter: &BudgetFilter) -> SqlConditions {
    let mut conds = SqlConditions::new();
    if let Some(division) = &filter.division {
        conds.push_eq("b.division", division.clone());
    }
    conds.push_cmp("b.month", ">=", filter.range.from);
    conds.push_cmp("b.month", "<=", filter.range.to);
    conds
}

/// Conditions for the CSV export over `projects p`, `customers cu`,
/// `project_postpo_monitoring m` and the `rp_rng` month range.
///
/// `$1` is always the first day of the export year.
#[must_use]
pub fn export_conditions(filter: &ExportFilter) -> SqlConditions {
    let mut conds = SqlConditions::new();
    conds.bind(filter.year_start());

    if let Some(division) = &filter.division {
        conds.push_eq("p.division", division.clone());
    }
    if let Some(customer_id) = filter.customer_id {
        conds.push_eq("p.customer_id", customer_id);
    }
    if let Some(status) = &filter.status {
        conds.push_eq("p.status", status.clone());
    }
    if let Some(released) = &filter.sph_released {
        conds.push_eq("COALESCE(p.sph_release_status, 'No')", released.clone());
    }
    if let Some(project_type) = &filter.project_type {
        conds.push_eq("p.project_type", project_type.clone());
    }
    if let Some(stage) = filter.sales_stage {
        conds.push_eq("p.sales_stage", stage);
    }
    if filter.pipeline_only {
        conds.push_raw("p.sales_stage BETWEEN 1 AND 5");
    }
    if let Some(sph_status) = &filter.sph_status {
        conds.push_eq(
            "(CASE lower(COALESCE(p.sph_status, '')) \
               WHEN 'win' THEN 'Win' WHEN 'hold' THEN 'Hold' \
               WHEN 'loss' THEN 'Loss' WHEN 'drop' THEN 'Drop' \
               ELSE 'Open' END)",
            sph_status.clone(),
        );
    }
    match filter.execution {
        Some(ExecutionFilter::Completed) => {
            conds.push_raw(format!("m.project_id IS NOT NULL AND {ALL_POSTPO_DONE}"));
        }
        Some(ExecutionFilter::InExecution) => {
            conds.push_raw(format!("m.project_id IS NOT NULL AND NOT {ALL_POSTPO_DONE}"));
        }
        None => {}
    }
    if let Some(pattern) = &filter.search {
        let placeholder = conds.bind(pattern.clone());
        conds.push_raw(format!(
            "(p.project_code ILIKE {placeholder} OR p.description ILIKE {placeholder})"
        ));
    }
    if let Some(start) = filter.start_month {
        let placeholder = conds.bind(start);
        conds.push_raw(format!(
            "(rp_rng.max_month IS NOT NULL AND rp_rng.max_month >= {placeholder})"
        ));
    }
    if let Some(end) = filter.end_month {
        let placeholder = conds.bind(end);
        conds.push_raw(format!(
            "(rp_rng.min_month IS NOT NULL AND rp_rng.min_month <= {placeholder})"
        ));
    }
    conds
}
