//! Revenue realization booking.
//!
//! Realization is recorded against a revenue-plan month. It can be booked to
//! a different month than the one it was entered on, in which case it moves:
//! the destination month receives the amount and the source month's
//! realization is reset, so the amount is never counted twice.

use rust_decimal::Decimal;
use salesdesk_shared::AppError;
use serde::Deserialize;
use thiserror::Error;

use crate::month::{MonthError, YearMonth};

/// Realization input errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RevenueError {
    /// Negative realization amount.
    #[error("realization must not be negative")]
    NegativeRealization,

    /// Bad month value.
    #[error(transparent)]
    Month(#[from] MonthError),
}

impl From<RevenueError> for AppError {
    fn from(err: RevenueError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Realization request body.
#[derive(Debug, Clone, Deserialize)]
pub struct RealizationInput {
    /// Realized amount.
    pub realization: Decimal,
    /// Month to book the amount on, `YYYY-MM`; defaults to the source month.
    #[serde(default)]
    pub apply_month: Option<String>,
    /// Client move flag. A different `apply_month` always moves, and moving
    /// onto the same month is a no-op, so the flag never changes the outcome.
    #[serde(default, rename = "move")]
    pub move_from_source: bool,
}

/// What to write for a realization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealizationPlan {
    /// Month the amount was entered on.
    pub source: YearMonth,
    /// Month that receives the amount.
    pub target: YearMonth,
    /// Amount to set on the target month.
    pub amount: Decimal,
    /// Whether the source month's realization is reset to zero.
    pub clear_source: bool,
}

/// Plans a realization write for `source_month`.
///
/// Booking to a different month always moves the amount.
///
/// # Errors
///
/// Returns `RevenueError` for malformed months or a negative amount.
pub fn plan_realization(
    source_month: &str,
    input: &RealizationInput,
) -> Result<RealizationPlan, RevenueError> {
    let source = YearMonth::parse(source_month)?;
    if input.realization < Decimal::ZERO {
        return Err(RevenueError::NegativeRealization);
    }

    let target = match input.apply_month.as_deref().map(str::trim) {
        None | Some("") => source,
        Some(month) => YearMonth::parse(month)?,
    };

    Ok(RealizationPlan {
        source,
        target,
        amount: input.realization,
        clear_source: target != source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn input(amount: Decimal, apply: Option<&str>, mv: bool) -> RealizationInput {
        RealizationInput {
            realization: amount,
            apply_month: apply.map(str::to_string),
            move_from_source: mv,
        }
    }

    fn ym(s: &str) -> YearMonth {
        YearMonth::parse(s).unwrap()
    }

    /// Replays a plan over `(month, realization)` pairs in the order the
    /// repository writes rows: upsert the target, set it, clear the source.
    fn replay(plan: &RealizationPlan, months: &mut Vec<(YearMonth, Decimal)>) {
        match months.iter_mut().find(|(m, _)| *m == plan.target) {
            Some(entry) => entry.1 = plan.amount,
            None => months.push((plan.target, plan.amount)),
        }
        if plan.clear_source
            && let Some(entry) = months.iter_mut().find(|(m, _)| *m == plan.source)
        {
            entry.1 = Decimal::ZERO;
        }
    }

    #[test]
    fn test_same_month_does_not_clear() {
        let plan = plan_realization("2025-03", &input(dec!(100), None, false)).unwrap();
        assert_eq!(plan.target, ym("2025-03"));
        assert!(!plan.clear_source);
    }

    #[test]
    fn test_move_flag_on_same_month_is_ignored() {
        let plan = plan_realization("2025-03", &input(dec!(100), Some("2025-03"), true)).unwrap();
        assert!(!plan.clear_source);
    }

    #[test]
    fn test_different_apply_month_forces_move() {
        let plan = plan_realization("2025-03", &input(dec!(100), Some("2025-05"), false)).unwrap();
        assert_eq!(plan.source, ym("2025-03"));
        assert_eq!(plan.target, ym("2025-05"));
        assert!(plan.clear_source);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            plan_realization("March", &input(dec!(1), None, false)),
            Err(RevenueError::Month(_))
        ));
        assert!(matches!(
            plan_realization("2025-03", &input(dec!(1), Some("2025/05"), false)),
            Err(RevenueError::Month(_))
        ));
        assert_eq!(
            plan_realization("2025-03", &input(dec!(-1), None, false)),
            Err(RevenueError::NegativeRealization)
        );
    }

    #[test]
    fn test_move_body_field_name() {
        let body: RealizationInput =
            serde_json::from_str(r#"{"realization": 50, "apply_month": "2025-04", "move": true}"#)
                .unwrap();
        assert!(body.move_from_source);
        assert_eq!(body.realization, dec!(50));
    }

    #[test]
    fn test_move_creates_missing_target_month() {
        let mut months = vec![(ym("2025-01"), dec!(0))];
        let plan = plan_realization("2025-01", &input(dec!(75), Some("2025-02"), true)).unwrap();
        replay(&plan, &mut months);
        assert_eq!(months, vec![(ym("2025-01"), dec!(0)), (ym("2025-02"), dec!(75))]);
    }

    proptest! {
        #[test]
        fn prop_moved_realization_is_counted_once(
            src in 1u32..=12,
            dst in 1u32..=12,
            existing in 0i64..1_000_000,
            amount in 0i64..1_000_000,
        ) {
            let src_m = format!("2025-{src:02}");
            let dst_m = format!("2025-{dst:02}");
            let existing = Decimal::new(existing, 2);
            let amount = Decimal::new(amount, 2);

            let mut months = vec![(ym(&src_m), existing)];
            let plan = plan_realization(&src_m, &input(amount, Some(&dst_m), true)).unwrap();
            replay(&plan, &mut months);

            let total: Decimal = months.iter().map(|(_, v)| *v).sum();
            prop_assert_eq!(total, amount);
        }
    }
}
