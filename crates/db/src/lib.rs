//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - The SQL condition builder shared by reporting queries
//! - Database migrations

pub mod entities;
pub mod error;
pub mod filter;
pub mod migration;
pub mod repositories;

pub use error::is_unique_violation;
pub use repositories::{
    BudgetRepository, CustomerRepository, DashboardRepository, ExportRepository,
    PostPoRepository, ProjectRepository, UserRepository,
};

use std::time::Duration;

use salesdesk_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a pooled connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(options).await
}
