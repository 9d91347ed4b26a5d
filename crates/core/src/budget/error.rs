//! Budget error types.

use rust_decimal::Decimal;
use salesdesk_shared::AppError;
use thiserror::Error;

use crate::month::MonthError;

/// Budget-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BudgetError {
    /// Budget amount cannot be negative.
    #[error("budget_amount must not be negative")]
    NegativeAmount,

    /// Realization amounts must be strictly positive.
    #[error("amount must be greater than 0")]
    NonPositiveRealization,

    /// Realization category missing.
    #[error("category is required")]
    MissingCategory,

    /// New amount would leave less than what is already realized.
    #[error("budget_amount cannot be less than total realization ({total_realization})")]
    AmountBelowRealization {
        /// Realization already booked against the budget.
        total_realization: Decimal,
    },

    /// Bad month value.
    #[error(transparent)]
    Month(#[from] MonthError),
}

impl From<BudgetError> for AppError {
    fn from(err: BudgetError) -> Self {
        match err {
            BudgetError::AmountBelowRealization { .. } => Self::BusinessRule(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}
