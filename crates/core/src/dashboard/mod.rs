//! Dashboard filters, KPI math and response types.
//!
//! Filters are resolved here against the caller and today's date; the
//! database layer turns them into SQL conditions and returns raw sums,
//! which [`kpi`] folds into the response blocks.

pub mod filter;
pub mod kpi;
pub mod types;

pub use filter::{BudgetFilter, DashboardQuery, ProjectFilter};
pub use kpi::{
    DashboardKpis, KpiBlock, KpiSums, OpportunityBlock, Pipeline, PipelineStage, StageRow,
    conversion, pct,
};
pub use types::{
    BreakdownItem, BudgetTotals, CustomerRow, DashboardResponse, DashboardTotals, ForecastPoint,
    TopProject,
};
