//! `SeaORM` entity definitions.

pub mod prelude;

pub mod budget_realization;
pub mod budgets;
pub mod customers;
pub mod project_postpo_monitoring;
pub mod project_revenue_plan;
pub mod projects;
pub mod users;
