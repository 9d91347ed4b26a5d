//! Helpers for classifying database errors.

use sea_orm::{DbErr, SqlErr};

/// Returns true when `err` is a `UNIQUE` constraint violation.
#[must_use]
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Returns true when `err` is a foreign key violation.
#[must_use]
pub fn is_foreign_key_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
}
