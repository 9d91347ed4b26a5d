//! KPI and pipeline math over aggregated sums.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::project::SalesStage;

/// `value / target * 100`, rounded to 2 dp; 0 for a zero target.
#[must_use]
pub fn pct(value: Decimal, target: Decimal) -> Decimal {
    if target.is_zero() {
        return Decimal::ZERO;
    }
    (value / target * Decimal::ONE_HUNDRED).round_dp(2)
}

/// `real / target`, rounded to 4 dp; 0 for a zero target.
#[must_use]
pub fn conversion(real: Decimal, target: Decimal) -> Decimal {
    if target.is_zero() {
        return Decimal::ZERO;
    }
    (real / target).round_dp(4)
}

/// Raw sums returned by the KPI query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KpiSums {
    /// Realization over every filtered row.
    pub total_sales_real: Decimal,
    /// Target of Prospect and Carry Over projects.
    pub baseline_target: Decimal,
    /// Carry Over realization.
    pub carry_real: Decimal,
    /// Carry Over target.
    pub carry_target: Decimal,
    /// Project Based realization (Prospect/Carry Over).
    pub project_based_real: Decimal,
    /// Project Based target (Prospect/Carry Over).
    pub project_based_target: Decimal,
    /// Recurring realization (Prospect/Carry Over).
    pub recurring_real: Decimal,
    /// Recurring target (Prospect/Carry Over).
    pub recurring_target: Decimal,
    /// New Recurring realization (New Prospect).
    pub new_recurring_real: Decimal,
    /// New Recurring target (New Prospect).
    pub new_recurring_target: Decimal,
    /// Target over every filtered row.
    pub opportunity_target: Decimal,
}

/// One KPI card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KpiBlock {
    /// Achieved value.
    pub value: Decimal,
    /// Comparison target.
    pub target: Decimal,
    /// Achievement percentage.
    pub pct: Decimal,
}

impl KpiBlock {
    fn new(value: Decimal, target: Decimal) -> Self {
        Self {
            value,
            target,
            pct: pct(value, target),
        }
    }
}

/// Opportunity card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpportunityBlock {
    /// Total target across every status.
    pub target: Decimal,
    /// Total realization over total target.
    pub conversion: Decimal,
}

/// KPI section of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardKpis {
    /// All realization vs. the Prospect + Carry Over baseline.
    pub total_sales: KpiBlock,
    /// Carry Over projects.
    pub carry_over: KpiBlock,
    /// Project Based projects.
    pub project_based: KpiBlock,
    /// Recurring projects.
    pub recurring: KpiBlock,
    /// New Recurring projects.
    pub new_recurring: KpiBlock,
    /// Opportunity conversion.
    pub opportunity: OpportunityBlock,
}

impl DashboardKpis {
    /// Builds the KPI cards from query sums.
    #[must_use]
    pub fn from_sums(sums: KpiSums) -> Self {
        Self {
            total_sales: KpiBlock::new(sums.total_sales_real, sums.baseline_target),
            carry_over: KpiBlock::new(sums.carry_real, sums.carry_target),
            project_based: KpiBlock::new(sums.project_based_real, sums.project_based_target),
            recurring: KpiBlock::new(sums.recurring_real, sums.recurring_target),
            new_recurring: KpiBlock::new(sums.new_recurring_real, sums.new_recurring_target),
            opportunity: OpportunityBlock {
                target: sums.opportunity_target,
                conversion: conversion(sums.total_sales_real, sums.opportunity_target),
            },
        }
    }
}

/// One row of the pipeline query, grouped by sales stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageRow {
    /// Raw stage number.
    pub stage: i32,
    /// Distinct projects in the stage.
    pub count: i64,
    /// Target revenue of those projects within the filter.
    pub target_revenue: Decimal,
}

/// A pipeline bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineStage {
    /// Stage number, 1..=6.
    pub stage: u8,
    /// Stage label.
    pub label: &'static str,
    /// Distinct projects in the stage.
    pub count: i64,
}

/// Sales pipeline section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pipeline {
    /// All six stages in order.
    pub stages: Vec<PipelineStage>,
    /// Target revenue weighted by stage probability.
    pub total_weighted_revenue: Decimal,
}

impl Pipeline {
    /// Folds stage rows into six bars; rows outside 1..=6 are ignored.
    #[must_use]
    pub fn from_stage_rows(rows: &[StageRow]) -> Self {
        let mut stages: Vec<PipelineStage> = SalesStage::all()
            .map(|s| PipelineStage {
                stage: s.value(),
                label: s.label(),
                count: 0,
            })
            .collect();
        let mut total_weighted_revenue = Decimal::ZERO;

        for row in rows {
            let Ok(stage) = SalesStage::new(row.stage) else {
                continue;
            };
            let slot = &mut stages[usize::from(stage.value() - 1)];
            slot.count += row.count;
            total_weighted_revenue += row.target_revenue * stage.probability();
        }

        Self {
            stages,
            total_weighted_revenue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(50), dec!(200), dec!(25))]
    #[case(dec!(1), dec!(3), dec!(33.33))]
    #[case(dec!(10), dec!(0), dec!(0))]
    #[case(dec!(300), dec!(200), dec!(150))]
    fn test_pct(#[case] value: Decimal, #[case] target: Decimal, #[case] expected: Decimal) {
        assert_eq!(pct(value, target), expected);
    }

    #[rstest]
    #[case(dec!(1), dec!(3), dec!(0.3333))]
    #[case(dec!(5), dec!(0), dec!(0))]
    fn test_conversion(#[case] real: Decimal, #[case] target: Decimal, #[case] expected: Decimal) {
        assert_eq!(conversion(real, target), expected);
    }

    #[test]
    fn test_kpis_from_sums() {
        let kpis = DashboardKpis::from_sums(KpiSums {
            total_sales_real: dec!(400),
            baseline_target: dec!(800),
            carry_real: dec!(100),
            carry_target: dec!(400),
            new_recurring_target: dec!(0),
            opportunity_target: dec!(1000),
            ..KpiSums::default()
        });

        assert_eq!(kpis.total_sales.pct, dec!(50));
        assert_eq!(kpis.carry_over.pct, dec!(25));
        assert_eq!(kpis.new_recurring.pct, dec!(0));
        assert_eq!(kpis.opportunity.conversion, dec!(0.4));
    }

    #[test]
    fn test_pipeline_always_has_six_stages() {
        let pipeline = Pipeline::from_stage_rows(&[]);

        assert_eq!(pipeline.stages.len(), 6);
        assert_eq!(pipeline.stages[0].label, "Prospecting");
        assert_eq!(pipeline.stages[5].label, "Closing");
        assert_eq!(pipeline.total_weighted_revenue, Decimal::ZERO);
    }

    #[test]
    fn test_pipeline_weights_by_probability() {
        let rows = [
            StageRow {
                stage: 1,
                count: 2,
                target_revenue: dec!(1000),
            },
            StageRow {
                stage: 6,
                count: 1,
                target_revenue: dec!(500),
            },
            StageRow {
                stage: 9,
                count: 7,
                target_revenue: dec!(999),
            },
        ];
        let pipeline = Pipeline::from_stage_rows(&rows);

        assert_eq!(pipeline.stages[0].count, 2);
        assert_eq!(pipeline.stages[5].count, 1);
        assert_eq!(pipeline.total_weighted_revenue, dec!(600));
    }

    #[test]
    fn test_kpi_serializes_field_names() {
        let json = serde_json::to_value(DashboardKpis::from_sums(KpiSums::default())).unwrap();
        assert_eq!(json["total_sales"]["pct"], "0");
        assert_eq!(json["opportunity"]["conversion"], "0");
    }
}
