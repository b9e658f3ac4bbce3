//! Rate policies: fixed APR or an introductory APR that expires

use serde::{Deserialize, Serialize};

use crate::numeric::monthly_rate;
use crate::validation::Validator;

/// Two-phase rate: `intro_apr` for the first `intro_periods` periods, then
/// `regular_apr`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatePeriod {
    /// Promotional annual percentage rate
    pub intro_apr: f64,
    /// Number of periods the promotional rate applies
    pub intro_periods: u32,
    /// Annual percentage rate after the promotion expires
    pub regular_apr: f64,
}

/// How the annual rate evolves over the life of a balance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatePolicy {
    /// Same APR every period
    Fixed { apr: f64 },
    /// Introductory APR followed by a regular APR
    Introductory(RatePeriod),
}

impl RatePolicy {
    pub fn fixed(apr: f64) -> Self {
        RatePolicy::Fixed { apr }
    }

    pub fn introductory(intro_apr: f64, intro_periods: u32, regular_apr: f64) -> Self {
        RatePolicy::Introductory(RatePeriod {
            intro_apr,
            intro_periods,
            regular_apr,
        })
    }

    /// Annual percentage rate applying to period index `k` (0-based)
    pub fn annual_percent(&self, k: u32) -> f64 {
        match self {
            RatePolicy::Fixed { apr } => *apr,
            RatePolicy::Introductory(p) => {
                if k < p.intro_periods {
                    p.intro_apr
                } else {
                    p.regular_apr
                }
            }
        }
    }

    /// Fractional monthly rate for period index `k`
    pub fn periodic_rate(&self, k: u32) -> f64 {
        monthly_rate(self.annual_percent(k))
    }

    /// The rate that governs the balance long-term (used for ordering debts)
    pub fn regular_apr(&self) -> f64 {
        match self {
            RatePolicy::Fixed { apr } => *apr,
            RatePolicy::Introductory(p) => p.regular_apr,
        }
    }

    /// True when the rate never changes
    pub fn is_constant(&self) -> bool {
        match self {
            RatePolicy::Fixed { .. } => true,
            RatePolicy::Introductory(p) => p.intro_periods == 0 || p.intro_apr == p.regular_apr,
        }
    }

    /// Check that every rate is finite and non-negative
    pub fn validate(&self, prefix: &str, v: &mut Validator) {
        match self {
            RatePolicy::Fixed { apr } => {
                v.non_negative(&format!("{}.apr", prefix), *apr);
            }
            RatePolicy::Introductory(p) => {
                v.non_negative(&format!("{}.intro_apr", prefix), p.intro_apr)
                    .non_negative(&format!("{}.regular_apr", prefix), p.regular_apr);
            }
        }
    }
}

impl Default for RatePolicy {
    fn default() -> Self {
        RatePolicy::fixed(0.0)
    }
}
