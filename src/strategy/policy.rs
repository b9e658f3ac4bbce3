//! Payoff ordering policies

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::balance::Balance;

/// Order in which extra budget is directed at balances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPolicy {
    /// Highest APR first
    Avalanche,
    /// Smallest balance first
    Snowball,
    /// Weighted score of normalized rate and normalized balance share
    Blended,
}

impl AllocationPolicy {
    pub const ALL: [AllocationPolicy; 3] = [
        AllocationPolicy::Avalanche,
        AllocationPolicy::Snowball,
        AllocationPolicy::Blended,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationPolicy::Avalanche => "avalanche",
            AllocationPolicy::Snowball => "snowball",
            AllocationPolicy::Blended => "blended",
        }
    }

    /// Indices of `balances` in payoff priority order
    ///
    /// Sorting is stable, so exact ties keep their input order.
    pub fn priority(&self, balances: &[Balance], rate_weight: f64) -> Vec<usize> {
        let mut order: Vec<usize> = (0..balances.len()).collect();

        match self {
            AllocationPolicy::Avalanche => order.sort_by(|&a, &b| {
                let (a, b) = (&balances[a], &balances[b]);
                b.apr()
                    .total_cmp(&a.apr())
                    .then(a.principal.total_cmp(&b.principal))
            }),
            AllocationPolicy::Snowball => order.sort_by(|&a, &b| {
                let (a, b) = (&balances[a], &balances[b]);
                a.principal
                    .total_cmp(&b.principal)
                    .then(b.apr().total_cmp(&a.apr()))
            }),
            AllocationPolicy::Blended => {
                let scores = blended_scores(balances, rate_weight);
                order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
            }
        }

        order
    }
}

/// Score each balance as `w * rate / max_rate + (1 - w) * (1 - share)`
/// where `share` is the balance's fraction of the total owed
fn blended_scores(balances: &[Balance], rate_weight: f64) -> Vec<f64> {
    let max_rate = balances.iter().map(|b| b.apr()).fold(0.0_f64, f64::max);
    let total: f64 = balances.iter().map(|b| b.principal).sum();

    balances
        .iter()
        .map(|b| {
            let rate_term = if max_rate > 0.0 { b.apr() / max_rate } else { 0.0 };
            let share = if total > 0.0 { b.principal / total } else { 0.0 };
            rate_weight * rate_term + (1.0 - rate_weight) * (1.0 - share)
        })
        .collect()
}

impl fmt::Display for AllocationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AllocationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "avalanche" => Ok(AllocationPolicy::Avalanche),
            "snowball" => Ok(AllocationPolicy::Snowball),
            "blended" | "hybrid" => Ok(AllocationPolicy::Blended),
            other => Err(format!(
                "unknown policy '{}' (expected avalanche, snowball or blended)",
                other
            )),
        }
    }
}
