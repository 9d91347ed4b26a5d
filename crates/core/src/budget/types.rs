//! Budget request and summary types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::division::Division;
use crate::month::YearMonth;

/// Request to create a monthly division budget.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBudgetInput {
    /// Requested division; overridden for division-scoped callers.
    #[serde(default)]
    pub division: String,
    /// Month as `YYYY-MM`.
    pub month: String,
    /// Budgeted amount.
    pub budget_amount: Decimal,
}

/// A budget that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidBudget {
    /// Owning division.
    pub division: Division,
    /// Budget month.
    pub month: YearMonth,
    /// Budgeted amount.
    pub budget_amount: Decimal,
}

/// Request to change a budget amount.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBudgetInput {
    /// New budgeted amount.
    pub budget_amount: Decimal,
}

/// Request to book realization against a budget.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRealizationInput {
    /// Spending category.
    pub category: String,
    /// Amount, strictly positive.
    pub amount: Decimal,
    /// Optional note.
    #[serde(default)]
    pub note: Option<String>,
}

/// Partial realization update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRealizationInput {
    /// New category.
    #[serde(default)]
    pub category: Option<String>,
    /// New amount, strictly positive.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// New note.
    #[serde(default)]
    pub note: Option<String>,
}

/// Budget amount with realization rollup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetSummary {
    /// Budgeted amount.
    pub budget_amount: Decimal,
    /// Sum of realization rows.
    pub total_realization: Decimal,
    /// Budget left to spend (negative when overspent).
    pub remaining: Decimal,
    /// Realization as a percentage of the budget; absent for a zero budget.
    pub achievement_pct: Option<Decimal>,
}

impl BudgetSummary {
    /// Computes remaining balance and achievement for a budget.
    #[must_use]
    pub fn new(budget_amount: Decimal, total_realization: Decimal) -> Self {
        let achievement_pct = if budget_amount.is_zero() {
            None
        } else {
            Some((total_realization / budget_amount * Decimal::ONE_HUNDRED).round_dp(2))
        };

        Self {
            budget_amount,
            total_realization,
            remaining: budget_amount - total_realization,
            achievement_pct,
        }
    }
}
