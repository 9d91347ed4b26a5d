//! Entity re-exports.

pub use super::budget_realization::Entity as BudgetRealization;
pub use super::budgets::Entity as Budgets;
pub use super::customers::Entity as Customers;
pub use super::project_postpo_monitoring::Entity as ProjectPostpoMonitoring;
pub use super::project_revenue_plan::Entity as ProjectRevenuePlan;
pub use super::projects::Entity as Projects;
pub use super::users::Entity as Users;
