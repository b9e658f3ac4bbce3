//! Compound growth projection for savings with monthly contributions

use serde::{Deserialize, Serialize};

use crate::amortization::{fv_annuity_ordinary, fv_lump_sum};
use crate::error::EngineError;
use crate::numeric::{monthly_rate, percent_to_rate, MONTHS_PER_YEAR};
use crate::validation;

/// One year of a growth chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub year: u32,

    /// Initial deposit plus contributions made so far
    pub total_contributions: f64,

    /// Interest earned so far
    pub growth: f64,

    /// Balance at the end of the year
    pub total_value: f64,
}

/// Headline figures for a projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthSummary {
    pub years: u32,
    pub future_value: f64,
    pub total_deposited: f64,
    pub total_growth: f64,

    /// Future value deflated by inflation over the horizon
    pub real_value: f64,

    /// Excess of compound growth over simple interest on the deposits.
    /// Can be negative over short horizons.
    pub compounding_power: f64,
}

/// Year-by-year projection plus summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthProjection {
    /// Points for years 0 through `years`
    pub yearly: Vec<ChartPoint>,
    pub summary: GrowthSummary,
}

/// Value after `months` of monthly compounding with end-of-month contributions
fn value_after(initial: f64, monthly_contribution: f64, periodic_rate: f64, months: u32) -> f64 {
    fv_lump_sum(initial, months, periodic_rate)
        + fv_annuity_ordinary(monthly_contribution, months, periodic_rate)
}

/// Project savings growth over `years`
///
/// Closed form per year: the lump sum compounds monthly and contributions
/// form an ordinary annuity. A zero rate degrades to plain addition.
pub fn project(
    initial: f64,
    monthly_contribution: f64,
    annual_rate_percent: f64,
    years: u32,
    inflation_percent: f64,
) -> Result<GrowthProjection, EngineError> {
    let mut v =
        validation::growth_inputs(initial, monthly_contribution, annual_rate_percent, years);
    v.non_negative("inflation_percent", inflation_percent);
    v.finish()?;

    let periodic_rate = monthly_rate(annual_rate_percent);

    let yearly: Vec<ChartPoint> = (0..=years)
        .map(|year| {
            let months = year * MONTHS_PER_YEAR;
            let total_value = value_after(initial, monthly_contribution, periodic_rate, months);
            let total_contributions = initial + monthly_contribution * months as f64;
            ChartPoint {
                year,
                total_contributions,
                growth: total_value - total_contributions,
                total_value,
            }
        })
        .collect();

    let last = yearly[yearly.len() - 1];
    let future_value = last.total_value;
    let total_deposited = last.total_contributions;

    let real_value = future_value / (1.0 + percent_to_rate(inflation_percent)).powi(years as i32);
    let simple_baseline =
        total_deposited * (1.0 + percent_to_rate(annual_rate_percent) * years as f64);

    let summary = GrowthSummary {
        years,
        future_value,
        total_deposited,
        total_growth: future_value - total_deposited,
        real_value,
        compounding_power: future_value - simple_baseline,
    };

    log::debug!(
        "projected {:.2} + {:.2}/month at {}% for {} years: {:.2}",
        initial,
        monthly_contribution,
        annual_rate_percent,
        years,
        future_value
    );

    Ok(GrowthProjection { yearly, summary })
}

/// Effective annual yield of a monthly-compounded APR, as a percentage
pub fn effective_annual_yield(annual_rate_percent: f64) -> f64 {
    ((1.0 + monthly_rate(annual_rate_percent)).powi(MONTHS_PER_YEAR as i32) - 1.0) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_growth_beats_deposits() {
        let projection = project(5000.0, 200.0, 4.5, 5, 0.0).unwrap();
        let summary = projection.summary;

        assert_eq!(summary.total_deposited, 17_000.0);
        assert!(summary.future_value > 17_000.0);
        assert_relative_eq!(summary.real_value, summary.future_value);
        assert_eq!(projection.yearly.len(), 6);
    }

    #[test]
    fn test_known_future_value() {
        // $10,000 at 6% compounded monthly for 10 years, no contributions
        let projection = project(10_000.0, 0.0, 6.0, 10, 0.0).unwrap();
        assert!((projection.summary.future_value - 18_193.97).abs() < 0.01);
    }

    #[test]
    fn test_zero_rate_is_plain_sum() {
        let projection = project(1000.0, 100.0, 0.0, 3, 2.0).unwrap();

        assert_eq!(projection.summary.future_value, 4600.0);
        assert_eq!(projection.summary.total_growth, 0.0);
        assert_eq!(projection.yearly[1].total_value, 2200.0);
        assert_eq!(projection.summary.compounding_power, 0.0);
    }

    #[test]
    fn test_year_zero_is_initial_deposit() {
        let projection = project(2500.0, 50.0, 5.0, 2, 0.0).unwrap();
        let origin = projection.yearly[0];
        assert_eq!(origin.year, 0);
        assert_eq!(origin.total_value, 2500.0);
        assert_eq!(origin.growth, 0.0);
    }

    #[test]
    fn test_real_value_deflates() {
        let projection = project(10_000.0, 0.0, 5.0, 10, 3.0).unwrap();
        let expected = projection.summary.future_value / 1.03_f64.powi(10);
        assert_relative_eq!(projection.summary.real_value, expected, epsilon = 1e-9);
        assert!(projection.summary.real_value < projection.summary.future_value);
    }

    #[test]
    fn test_compounding_power_can_be_negative() {
        // Contributions made through the year earn less than simple interest
        // on the full deposit total
        let projection = project(0.0, 500.0, 5.0, 1, 0.0).unwrap();
        assert!(projection.summary.compounding_power < 0.0);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let a = project(5000.0, 200.0, 4.5, 5, 2.5).unwrap();
        let b = project(5000.0, 200.0, 4.5, 5, 2.5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_invalid() {
        let err = project(-1.0, 0.0, 4.0, 0, -1.0).unwrap_err();
        assert_eq!(err.validation_errors().len(), 3);
    }

    #[test]
    fn test_rejects_horizon_beyond_limit() {
        let err = project(1_000.0, 100.0, 5.0, 400_000_000, 0.0).unwrap_err();
        assert_eq!(err.validation_errors()[0].field, "years");
        assert!(project(1_000.0, 100.0, 5.0, 100, 0.0).is_ok());
    }

    #[test]
    fn test_effective_annual_yield() {
        assert!((effective_annual_yield(12.0) - 12.6825).abs() < 1e-4);
        assert_eq!(effective_annual_yield(0.0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_future_value_monotone_in_rate(
            initial in 0.0f64..100_000.0,
            contribution in 0.0f64..5_000.0,
            rate in 0.0f64..20.0,
            bump in 0.0f64..5.0,
            years in 1u32..=40,
        ) {
            let low = project(initial, contribution, rate, years, 0.0).unwrap();
            let high = project(initial, contribution, rate + bump, years, 0.0).unwrap();
            let slack = 1e-9 * low.summary.future_value.max(1.0);
            prop_assert!(high.summary.future_value >= low.summary.future_value - slack);
        }
    }
}
