//! Dashboard response types.

use rust_decimal::Decimal;
use serde::Serialize;

use super::kpi::{DashboardKpis, Pipeline};

/// Prospect and Carry Over totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardTotals {
    /// Sum of plan targets.
    pub total_target_revenue: Decimal,
    /// Sum of plan realization.
    pub total_realization: Decimal,
    /// Distinct projects.
    pub total_projects: i64,
}

/// Label/value pair used by breakdown charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownItem {
    /// Group label.
    pub label: String,
    /// Summed value.
    pub value: Decimal,
}

/// Monthly target vs. realization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastPoint {
    /// Month as `YYYY-MM`.
    pub month: String,
    /// Target of Prospect/Carry Over projects.
    pub target: Decimal,
    /// Realization.
    pub realization: Decimal,
}

/// Project ranked by target revenue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopProject {
    /// Project ID.
    pub id: i64,
    /// Project description.
    pub name: String,
    /// Summed target revenue.
    pub target_revenue: Decimal,
}

/// Budget totals within the filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BudgetTotals {
    /// Sum of budget amounts.
    pub total_budget: Decimal,
    /// Sum of budget realization.
    pub total_realization: Decimal,
}

/// Per-customer target and realization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerRow {
    /// Customer name.
    pub customer: String,
    /// Summed target.
    pub total_target: Decimal,
    /// Summed realization.
    pub total_real: Decimal,
}

/// Full dashboard payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardResponse {
    /// KPI cards.
    pub kpis: DashboardKpis,
    /// Prospect and Carry Over totals.
    pub totals: DashboardTotals,
    /// Sales pipeline.
    pub pipeline: Pipeline,
    /// Target by division.
    pub division_breakdown: Vec<BreakdownItem>,
    /// Target by project type.
    pub type_breakdown: Vec<BreakdownItem>,
    /// Top customers by realization.
    pub customer_contribution: Vec<BreakdownItem>,
    /// Target by status.
    pub status_breakdown: Vec<BreakdownItem>,
    /// Budget totals.
    pub budget: BudgetTotals,
    /// Monthly forecast.
    pub forecast: Vec<ForecastPoint>,
    /// Top projects by target.
    pub top_projects: Vec<TopProject>,
    /// Per-customer table.
    pub customer_table: Vec<CustomerRow>,
}
