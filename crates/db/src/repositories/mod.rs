//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod budget;
pub mod customer;
pub mod dashboard;
pub mod export;
pub mod postpo;
pub mod project;
pub mod user;

pub use budget::{BudgetDetail, BudgetRepoError, BudgetRepository, BudgetView, TrendPoint};
pub use customer::{CustomerError, CustomerRepository};
pub use dashboard::DashboardRepository;
pub use export::ExportRepository;
pub use postpo::{PostPoMonitoring, PostPoRepository, StageProgress};
pub use project::{
    CreatedProject, PostPoStatuses, ProjectListItem, ProjectRepoError, ProjectRepository,
    ProjectRow, ProjectScope, ProjectSummary, RevenuePlanItem,
};
pub use user::{UserError, UserRepository};
