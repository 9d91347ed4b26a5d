//! Budget rules: validation and rollups.

use rust_decimal::Decimal;

use super::error::BudgetError;
use super::types::{
    BudgetSummary, CreateBudgetInput, CreateRealizationInput, UpdateRealizationInput, ValidBudget,
};
use crate::division::Division;
use crate::month::YearMonth;

/// Budget service for business logic.
pub struct BudgetService;

impl BudgetService {
    /// Rolls up a budget against its realization.
    #[must_use]
    pub fn summarize(budget_amount: Decimal, total_realization: Decimal) -> BudgetSummary {
        BudgetSummary::new(budget_amount, total_realization)
    }

    /// Validates a new budget for an already-resolved division.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::Month` for a bad month or
    /// `BudgetError::NegativeAmount` for a negative amount.
    pub fn validate_new(
        input: &CreateBudgetInput,
        division: Division,
    ) -> Result<ValidBudget, BudgetError> {
        let month = YearMonth::parse(&input.month)?;
        Self::validate_amount(input.budget_amount)?;
        Ok(ValidBudget {
            division,
            month,
            budget_amount: input.budget_amount,
        })
    }

    /// Budget amounts must not be negative.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::NegativeAmount` when `amount < 0`.
    pub fn validate_amount(amount: Decimal) -> Result<(), BudgetError> {
        if amount < Decimal::ZERO {
            Err(BudgetError::NegativeAmount)
        } else {
            Ok(())
        }
    }

    /// Rejects an amount update that would drop below booked realization.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::AmountBelowRealization` carrying the booked total.
    pub fn ensure_amount_covers_realization(
        new_amount: Decimal,
        total_realization: Decimal,
    ) -> Result<(), BudgetError> {
        Self::validate_amount(new_amount)?;
        if new_amount < total_realization {
            return Err(BudgetError::AmountBelowRealization { total_realization });
        }
        Ok(())
    }

    /// Validates a new realization row.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::MissingCategory` or `BudgetError::NonPositiveRealization`.
    pub fn validate_realization(input: &CreateRealizationInput) -> Result<(), BudgetError> {
        if input.category.trim().is_empty() {
            return Err(BudgetError::MissingCategory);
        }
        if input.amount <= Decimal::ZERO {
            return Err(BudgetError::NonPositiveRealization);
        }
        Ok(())
    }

    /// Validates the fields present in a partial realization update.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::MissingCategory` for a blank category or
    /// `BudgetError::NonPositiveRealization` for a non-positive amount.
    pub fn validate_realization_update(input: &UpdateRealizationInput) -> Result<(), BudgetError> {
        if input.category.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(BudgetError::MissingCategory);
        }
        if input.amount.is_some_and(|a| a <= Decimal::ZERO) {
            return Err(BudgetError::NonPositiveRealization);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_summarize() {
        let summary = BudgetService::summarize(dec!(1000), dec!(250));

        assert_eq!(summary.remaining, dec!(750));
        assert_eq!(summary.achievement_pct, Some(dec!(25.00)));
    }

    #[test]
    fn test_summarize_zero_budget_has_no_achievement() {
        let summary = BudgetService::summarize(dec!(0), dec!(10));

        assert_eq!(summary.remaining, dec!(-10));
        assert_eq!(summary.achievement_pct, None);
    }

    #[test]
    fn test_summarize_rounds_to_two_places() {
        let summary = BudgetService::summarize(dec!(3), dec!(1));
        assert_eq!(summary.achievement_pct, Some(dec!(33.33)));
    }

    #[test]
    fn test_update_below_realization_is_rejected() {
        assert_eq!(
            BudgetService::ensure_amount_covers_realization(dec!(400), dec!(500)),
            Err(BudgetError::AmountBelowRealization {
                total_realization: dec!(500)
            })
        );
        assert!(BudgetService::ensure_amount_covers_realization(dec!(500), dec!(500)).is_ok());
    }

    #[test]
    fn test_validate_new_budget() {
        let input = CreateBudgetInput {
            division: "ignored".into(),
            month: "2025-04".into(),
            budget_amount: dec!(1500),
        };
        let valid = BudgetService::validate_new(&input, Division::ItSolutions).unwrap();
        assert_eq!(valid.month.to_string(), "2025-04");
        assert_eq!(valid.division, Division::ItSolutions);

        let bad = CreateBudgetInput {
            month: "April".into(),
            ..input
        };
        assert!(matches!(
            BudgetService::validate_new(&bad, Division::ItSolutions),
            Err(BudgetError::Month(_))
        ));
    }

    #[test]
    fn test_validate_realization() {
        let ok = CreateRealizationInput {
            category: "Travel".into(),
            amount: dec!(10),
            note: None,
        };
        assert!(BudgetService::validate_realization(&ok).is_ok());

        let zero = CreateRealizationInput {
            amount: dec!(0),
            ..ok.clone()
        };
        assert_eq!(
            BudgetService::validate_realization(&zero),
            Err(BudgetError::NonPositiveRealization)
        );

        let blank = CreateRealizationInput {
            category: " ".into(),
            ..ok
        };
        assert_eq!(
            BudgetService::validate_realization(&blank),
            Err(BudgetError::MissingCategory)
        );
    }

    #[test]
    fn test_validate_realization_update() {
        let empty = UpdateRealizationInput::default();
        assert!(BudgetService::validate_realization_update(&empty).is_ok());

        let negative = UpdateRealizationInput {
            amount: Some(dec!(-1)),
            ..UpdateRealizationInput::default()
        };
        assert_eq!(
            BudgetService::validate_realization_update(&negative),
            Err(BudgetError::NonPositiveRealization)
        );
    }
}
