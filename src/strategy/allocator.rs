//! Multi-balance payoff allocation
//!
//! Every open balance receives its base payment (elected or minimum) each
//! period. Whatever is left of the monthly budget goes to the first open
//! balance in policy order. A balance's base payment is freed for the pool
//! starting the period after it closes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::policy::AllocationPolicy;
use crate::amortization::{amortize_period, Schedule};
use crate::balance::Balance;
use crate::config::EngineConfig;
use crate::error::{EngineError, NonConvergent};
use crate::numeric::{snap_to_zero, TOLERANCE};
use crate::validation::{Validator, MAX_PERIOD_CAP};

/// Aggregate position after one period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub period: u32,
    pub total_balance: f64,
    pub total_payment: f64,
    pub total_interest: f64,
}

/// A balance reaching zero
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffEvent {
    pub balance_id: String,
    pub period: u32,
}

/// Outcome of allocating a budget across balances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub policy: AllocationPolicy,

    /// Balance ids in the order extra budget was directed
    pub priority: Vec<String>,

    /// Per-balance schedules keyed by balance id
    pub schedules: BTreeMap<String, Schedule>,

    /// Aggregate balance, payment and interest per period
    pub timeline: Vec<TimelinePoint>,

    /// Balances in the order they were paid off
    pub payoff_order: Vec<PayoffEvent>,

    pub total_interest: f64,
    pub total_paid: f64,

    /// Periods until every balance is zero, `None` if the cap was hit
    pub months_to_payoff: Option<u32>,

    /// Interest when every balance is paid alone at its base payment
    pub baseline_interest: f64,
    pub baseline_months: Option<u32>,
    pub total_interest_saved: f64,

    /// Set when any balance was still open at the period cap
    pub non_convergent: bool,
}

impl AllocationResult {
    /// Warnings for each balance left open at the cap
    pub fn warnings(&self) -> Vec<(String, NonConvergent)> {
        self.schedules
            .iter()
            .filter_map(|(id, s)| s.warning().map(|w| (id.clone(), w)))
            .collect()
    }

    pub fn schedule(&self, balance_id: &str) -> Option<&Schedule> {
        self.schedules.get(balance_id)
    }
}

fn validate(
    balances: &[Balance],
    monthly_budget: f64,
    config: &EngineConfig,
) -> Result<(), EngineError> {
    let mut v = Validator::new();
    v.non_negative("monthly_budget", monthly_budget)
        .positive_count("period_cap", config.period_cap)
        .at_most_count("period_cap", config.period_cap, MAX_PERIOD_CAP)
        .within("blend_rate_weight", config.blend_rate_weight, 0.0, 1.0);

    if balances.is_empty() {
        v.push("balances", "must contain at least one balance");
    }

    let mut seen = HashSet::new();
    for (i, balance) in balances.iter().enumerate() {
        let prefix = format!("balances[{}]", i);
        balance.validate(&prefix, &mut v);
        if !seen.insert(balance.id.as_str()) {
            v.push(&format!("{}.id", prefix), "duplicate balance id");
        }
    }

    v.finish()
}

/// Balance being paid down during allocation
struct Tracked<'a> {
    balance: &'a Balance,
    remaining: f64,
    schedule: Schedule,
}

/// Allocate `monthly_budget` across `balances` according to `policy`
pub fn allocate(
    balances: &[Balance],
    monthly_budget: f64,
    policy: AllocationPolicy,
    config: &EngineConfig,
) -> Result<AllocationResult, EngineError> {
    validate(balances, monthly_budget, config)?;

    let period_cap = config.period_cap;
    let mut tracked: Vec<Tracked> = balances
        .iter()
        .map(|b| {
            let principal = snap_to_zero(b.principal);
            Tracked {
                balance: b,
                remaining: principal,
                schedule: Schedule::new(principal, period_cap),
            }
        })
        .collect();

    let required: f64 = tracked
        .iter()
        .filter(|t| t.remaining > 0.0)
        .map(|t| t.balance.base_payment())
        .sum();
    if monthly_budget + TOLERANCE < required {
        log::warn!(
            "budget {:.2} below required payments {:.2}",
            monthly_budget,
            required
        );
        return Err(EngineError::InsufficientBudget {
            budget: monthly_budget,
            required,
        });
    }

    let order = policy.priority(balances, config.blend_rate_weight);
    let mut timeline = Vec::new();
    let mut payoff_order = Vec::new();

    for k in 0..period_cap {
        let reserved: f64 = tracked
            .iter()
            .filter(|t| t.remaining > 0.0)
            .map(|t| t.balance.base_payment())
            .sum();
        let Some(&target) = order.iter().find(|&&i| tracked[i].remaining > 0.0) else {
            break;
        };
        let pool = (monthly_budget - reserved).max(0.0);

        let mut point = TimelinePoint {
            period: k + 1,
            total_balance: 0.0,
            total_payment: 0.0,
            total_interest: 0.0,
        };

        for &i in &order {
            let t = &mut tracked[i];
            if t.remaining > 0.0 {
                let extra = if i == target { pool } else { 0.0 };
                let payment = t.balance.base_payment() + extra;
                let entry = amortize_period(t.remaining, payment, &t.balance.rate, k);

                t.remaining = entry.remaining_balance;
                point.total_payment += entry.payment;
                point.total_interest += entry.interest;
                t.schedule.add_entry(entry);

                if t.remaining == 0.0 {
                    payoff_order.push(PayoffEvent {
                        balance_id: t.balance.id.clone(),
                        period: k + 1,
                    });
                }
            }
            point.total_balance += t.remaining;
        }

        timeline.push(point);
    }

    let mut non_convergent = false;
    for t in tracked.iter_mut().filter(|t| t.remaining > 0.0) {
        t.schedule.non_convergent = true;
        non_convergent = true;
    }

    let baseline: Vec<Schedule> = balances
        .iter()
        .map(|b| base_payment_schedule(b, period_cap))
        .collect();
    let baseline_interest: f64 = baseline.iter().map(|s| s.total_interest()).sum();
    let baseline_months = latest_payoff(&baseline);

    let priority = order.iter().map(|&i| balances[i].id.clone()).collect();
    let schedules: BTreeMap<String, Schedule> = tracked
        .into_iter()
        .map(|t| (t.balance.id.clone(), t.schedule))
        .collect();

    let total_interest: f64 = schedules.values().map(|s| s.total_interest()).sum();
    let total_paid: f64 = schedules.values().map(|s| s.total_paid()).sum();
    let months_to_payoff = latest_payoff(schedules.values());

    if non_convergent {
        log::warn!(
            "{} allocation left balances open after {} periods",
            policy,
            period_cap
        );
    } else {
        log::debug!(
            "{} allocation: {} balances cleared in {:?} periods, interest {:.2}",
            policy,
            balances.len(),
            months_to_payoff,
            total_interest
        );
    }

    Ok(AllocationResult {
        policy,
        priority,
        schedules,
        timeline,
        payoff_order,
        total_interest,
        total_paid,
        months_to_payoff,
        baseline_interest,
        baseline_months,
        total_interest_saved: baseline_interest - total_interest,
        non_convergent,
    })
}

/// Allocate under every policy, for side-by-side comparison
pub fn allocate_all(
    balances: &[Balance],
    monthly_budget: f64,
    config: &EngineConfig,
) -> Result<Vec<AllocationResult>, EngineError> {
    AllocationPolicy::ALL
        .iter()
        .map(|&policy| allocate(balances, monthly_budget, policy, config))
        .collect()
}

/// Balance paid alone at its base payment, including zero-payment balances
/// which simply accrue until the cap
fn base_payment_schedule(balance: &Balance, period_cap: u32) -> Schedule {
    let principal = snap_to_zero(balance.principal);
    let mut schedule = Schedule::new(principal, period_cap);
    let mut remaining = principal;

    for k in 0..period_cap {
        if remaining == 0.0 {
            break;
        }
        let entry = amortize_period(remaining, balance.base_payment(), &balance.rate, k);
        remaining = entry.remaining_balance;
        schedule.add_entry(entry);
    }

    schedule.non_convergent = remaining > 0.0;
    schedule
}

/// Latest payoff period across schedules, `None` if any never paid off
fn latest_payoff<'a>(schedules: impl IntoIterator<Item = &'a Schedule>) -> Option<u32> {
    schedules
        .into_iter()
        .map(|s| s.months_to_payoff())
        .try_fold(0, |latest, months| months.map(|m| latest.max(m)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::RatePolicy;
    use proptest::prelude::*;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    fn two_cards() -> Vec<Balance> {
        vec![
            Balance::new("big-expensive", 10_000.0, 24.0, 200.0),
            Balance::new("small-cheap", 2_000.0, 6.0, 50.0),
        ]
    }

    #[test]
    fn test_insufficient_budget() {
        let err =
            allocate(&two_cards(), 200.0, AllocationPolicy::Avalanche, &config()).unwrap_err();
        assert_eq!(
            err,
            EngineError::InsufficientBudget {
                budget: 200.0,
                required: 250.0
            }
        );
    }

    #[test]
    fn test_closed_balances_need_no_minimum() {
        let balances = vec![
            Balance::new("paid", 0.0, 20.0, 500.0),
            Balance::new("open", 1_000.0, 0.0, 100.0),
        ];
        let result = allocate(&balances, 100.0, AllocationPolicy::Snowball, &config()).unwrap();
        assert_eq!(result.months_to_payoff, Some(10));
        assert!(result.schedule("paid").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let balances = vec![
            Balance::new("visa", 1_000.0, 20.0, 25.0),
            Balance::new("visa", 2_000.0, 18.0, 40.0),
        ];
        let err = allocate(&balances, 500.0, AllocationPolicy::Avalanche, &config()).unwrap_err();
        assert_eq!(err.validation_errors()[0].field, "balances[1].id");
    }

    #[test]
    fn test_avalanche_clears_high_rate_first() {
        let result = allocate(&two_cards(), 600.0, AllocationPolicy::Avalanche, &config()).unwrap();

        assert_eq!(result.priority, vec!["big-expensive", "small-cheap"]);
        assert!(!result.non_convergent);
        let first = &result.schedules["big-expensive"];
        // First period: $200 minimum plus the $350 pool
        assert!((first.entries[0].payment - 550.0).abs() < 1e-9);
    }

    #[test]
    fn test_avalanche_pays_high_rate_no_later_than_snowball() {
        let cards = two_cards();
        let avalanche = allocate(&cards, 600.0, AllocationPolicy::Avalanche, &config()).unwrap();
        let snowball = allocate(&cards, 600.0, AllocationPolicy::Snowball, &config()).unwrap();

        let a = avalanche.schedules["big-expensive"].months_to_payoff().unwrap();
        let s = snowball.schedules["big-expensive"].months_to_payoff().unwrap();
        assert!(a <= s, "avalanche {} vs snowball {}", a, s);
        assert!(avalanche.total_interest <= snowball.total_interest);
    }

    #[test]
    fn test_rollover_waits_one_period() {
        // "small" closes in period 1 on its own minimum; its $100 joins the
        // pool only from period 2
        let balances = vec![
            Balance::new("large", 5_000.0, 12.0, 100.0),
            Balance::new("small", 100.0, 0.0, 100.0),
        ];
        let result = allocate(&balances, 300.0, AllocationPolicy::Avalanche, &config()).unwrap();

        let large = &result.schedules["large"];
        assert!((large.entries[0].payment - 200.0).abs() < 1e-9);
        assert!((large.entries[1].payment - 300.0).abs() < 1e-9);
        assert_eq!(result.payoff_order[0].balance_id, "small");
        assert_eq!(result.payoff_order[0].period, 1);
        assert!((result.timeline[0].total_payment - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_convergent_flagged() {
        let balances = vec![Balance::new("visa", 10_000.0, 22.0, 200.0)];
        let result = allocate(&balances, 200.0, AllocationPolicy::Avalanche, &config()).unwrap();

        assert!(result.non_convergent);
        assert_eq!(result.months_to_payoff, None);
        let warnings = result.warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].0, "visa");
        assert_eq!(result.timeline.len(), 120);
    }

    #[test]
    fn test_interest_saved_against_minimums() {
        let result = allocate(&two_cards(), 600.0, AllocationPolicy::Blended, &config()).unwrap();
        assert!(result.total_interest_saved > 0.0);
        let saved = result.baseline_interest - result.total_interest;
        assert!((saved - result.total_interest_saved).abs() < 1e-9);
    }

    #[test]
    fn test_intro_rate_balance() {
        let balances = vec![
            Balance::new("transfer", 3_000.0, 0.0, 30.0)
                .with_rate(RatePolicy::introductory(0.0, 12, 21.0)),
            Balance::new("visa", 1_500.0, 19.0, 40.0),
        ];
        let result = allocate(&balances, 400.0, AllocationPolicy::Avalanche, &config()).unwrap();

        // Ranked by the regular APR, so the transfer is targeted first
        assert_eq!(result.priority[0], "transfer");
        assert_eq!(result.schedules["transfer"].entries[0].interest, 0.0);
        assert!(!result.non_convergent);
    }

    #[test]
    fn test_rejects_oversized_period_cap() {
        let config = EngineConfig {
            period_cap: u32::MAX,
            ..EngineConfig::default()
        };
        let err = allocate(&two_cards(), 600.0, AllocationPolicy::Snowball, &config).unwrap_err();
        assert_eq!(err.validation_errors()[0].field, "period_cap");
    }

    #[test]
    fn test_allocate_all_policies() {
        let results = allocate_all(&two_cards(), 600.0, &config()).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[1].policy, AllocationPolicy::Snowball);
    }

    proptest! {
        #[test]
        fn prop_budget_respected_and_interest_saved(
            p1 in 0.0f64..20_000.0,
            p2 in 0.0f64..20_000.0,
            r1 in 0.0f64..30.0,
            r2 in 0.0f64..30.0,
            extra in 0.0f64..1_000.0,
            policy_idx in 0usize..3,
        ) {
            let balances = vec![
                Balance::new("a", p1, r1, 50.0),
                Balance::new("b", p2, r2, 75.0),
            ];
            let budget = 125.0 + extra;
            let policy = AllocationPolicy::ALL[policy_idx];
            let result = allocate(&balances, budget, policy, &EngineConfig::default()).unwrap();

            for point in &result.timeline {
                prop_assert!(point.total_payment <= budget + 1e-6);
            }
            prop_assert!(result.total_interest_saved >= -1e-6);
            if !result.non_convergent {
                for (id, schedule) in &result.schedules {
                    let original = if id == "a" { p1 } else { p2 };
                    let drift = schedule.total_principal() - snap_to_zero(original);
                    prop_assert!(drift.abs() < 1e-6 * original.max(1.0));
                }
            }
        }
    }
}
