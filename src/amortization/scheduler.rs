//! Iterative amortization scheduler
//!
//! This is the single source of truth for how a balance is paid down. The
//! strategy allocator drives the same per-period step for each balance.

use super::closed_form::level_payment;
use super::rate::RatePolicy;
use super::schedule::{Schedule, ScheduleEntry};
use crate::error::EngineError;
use crate::numeric::{is_negligible, snap_to_zero};
use crate::validation::{Validator, MAX_PERIOD_CAP};

/// Default bound on schedule length
pub const DEFAULT_PERIOD_CAP: u32 = 120;

/// Bisection iterations when solving a payment for a time-varying rate
const PAYMENT_SEARCH_ITERATIONS: u32 = 200;

/// Upward nudges applied to a closed-form payment before giving up
const RECONCILE_ITERATIONS: u32 = 64;

/// Apply one period to `balance`
///
/// `k` is the 0-based period index. Interest accrues first, then the payment
/// (capped at what is owed) is split into interest and principal. The
/// principal portion is negative when the payment does not cover interest.
///
/// A payment covering everything owed closes the balance exactly, whatever
/// its magnitude.
pub fn amortize_period(balance: f64, payment: f64, policy: &RatePolicy, k: u32) -> ScheduleEntry {
    let interest = balance * policy.periodic_rate(k);

    let principal = if payment >= balance + interest {
        balance
    } else {
        let portion = (payment - interest).min(balance);
        if is_negligible(balance - portion) {
            balance
        } else {
            portion
        }
    };

    let remaining_balance = if principal == balance {
        0.0
    } else {
        snap_to_zero(balance - principal)
    };

    ScheduleEntry {
        period: k + 1,
        payment: principal + interest,
        principal,
        interest,
        remaining_balance,
        annual_rate: policy.annual_percent(k),
    }
}

fn validate_schedule_inputs(
    principal: f64,
    payment: f64,
    policy: &RatePolicy,
    period_cap: u32,
) -> Result<(), EngineError> {
    let mut v = Validator::new();
    v.non_negative("principal", principal)
        .non_negative("payment", payment)
        .positive_count("period_cap", period_cap)
        .at_most_count("period_cap", period_cap, MAX_PERIOD_CAP);
    policy.validate("rate", &mut v);
    v.finish()
}

/// Generate the period-by-period schedule for a fixed payment
///
/// Stops when the balance reaches zero or after `period_cap` periods. Hitting
/// the cap is not an error: the returned schedule has `non_convergent` set.
pub fn generate_schedule(
    principal: f64,
    payment: f64,
    policy: &RatePolicy,
    period_cap: u32,
) -> Result<Schedule, EngineError> {
    validate_schedule_inputs(principal, payment, policy, period_cap)?;

    let principal = snap_to_zero(principal);
    let mut schedule = Schedule::new(principal, period_cap);
    if principal == 0.0 {
        return Ok(schedule);
    }
    if payment == 0.0 {
        return Err(EngineError::PaymentInsufficient { principal });
    }

    let mut balance = principal;
    for k in 0..period_cap {
        let entry = amortize_period(balance, payment, policy, k);
        balance = entry.remaining_balance;
        schedule.add_entry(entry);

        if balance == 0.0 {
            break;
        }
    }

    if balance > 0.0 {
        schedule.non_convergent = true;
        log::warn!(
            "balance {:.2} not paid off within {} periods at payment {:.2} ({:.2} remaining)",
            principal,
            period_cap,
            payment,
            balance
        );
    } else {
        log::debug!(
            "balance {:.2} paid off in {} periods, interest {:.2}",
            principal,
            schedule.len(),
            schedule.total_interest()
        );
    }

    Ok(schedule)
}

/// True if `payment` clears `principal` within `periods`
fn pays_off_within(principal: f64, payment: f64, policy: &RatePolicy, periods: u32) -> bool {
    let mut balance = principal;
    for k in 0..periods {
        balance = amortize_period(balance, payment, policy, k).remaining_balance;
        if balance == 0.0 {
            return true;
        }
    }
    false
}

/// Smallest level payment that clears `principal` within `periods`
///
/// Closed form for constant rates. For time-varying rates the payment is
/// bracketed by the closed-form payments at the lowest and highest rates and
/// then bisected against the iterative schedule.
pub fn solve_payment(
    principal: f64,
    policy: &RatePolicy,
    periods: u32,
) -> Result<f64, EngineError> {
    if is_negligible(principal) {
        return Ok(0.0);
    }

    if policy.is_constant() {
        let payment = level_payment(principal, policy.periodic_rate(0), periods)?;
        return Ok(reconcile(principal, payment, policy, periods));
    }

    let (min_rate, max_rate) = (0..periods)
        .map(|k| policy.periodic_rate(k))
        .fold((f64::INFINITY, 0.0_f64), |(lo, hi), r| (lo.min(r), hi.max(r)));

    let mut low = level_payment(principal, min_rate, periods)?;
    let ceiling = level_payment(principal, max_rate, periods)?;
    let mut high = reconcile(principal, ceiling, policy, periods);

    for _ in 0..PAYMENT_SEARCH_ITERATIONS {
        let mid = (low + high) / 2.0;
        if pays_off_within(principal, mid, policy, periods) {
            high = mid;
        } else {
            low = mid;
        }

        if high - low < 1e-12 * high {
            break;
        }
    }

    Ok(high)
}

/// Nudge a closed-form payment up until the iterative schedule actually
/// clears the balance in `periods`; float drift compounds over long terms
///
/// Each nudge doubles, so the bound is reached only if the payment has
/// already grown far past anything the term could need.
fn reconcile(principal: f64, mut payment: f64, policy: &RatePolicy, periods: u32) -> f64 {
    let mut bump = 1e-12;
    for _ in 0..RECONCILE_ITERATIONS {
        if pays_off_within(principal, payment, policy, periods) {
            break;
        }
        payment *= 1.0 + bump;
        bump *= 2.0;
    }
    payment
}

/// Schedule that pays off `principal` in `periods` level payments
///
/// The payment is derived (see [`solve_payment`]) and the schedule is then
/// generated iteratively with `period_cap = periods`, so the final period
/// absorbs any closed-form rounding.
pub fn schedule_for_term(
    principal: f64,
    policy: &RatePolicy,
    periods: u32,
) -> Result<Schedule, EngineError> {
    validate_schedule_inputs(principal, 0.0, policy, periods)?;

    let payment = solve_payment(principal, policy, periods)?;
    generate_schedule(principal, payment, policy, periods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::TOLERANCE;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_single_payment_zero_rate() {
        // $1,800 car repair paid in one month at 0%
        let schedule = schedule_for_term(1800.0, &RatePolicy::fixed(0.0), 1).unwrap();

        assert_eq!(schedule.len(), 1);
        let entry = schedule.entries[0];
        assert_eq!(entry.interest, 0.0);
        assert_eq!(entry.principal, 1800.0);
        assert_eq!(entry.remaining_balance, 0.0);
        assert!(!schedule.non_convergent);
    }

    #[test]
    fn test_negative_amortization_hits_cap() {
        // 22% APR on $10,000 is ~$183/month interest; $200 leaves ~$17 principal
        let schedule =
            generate_schedule(10_000.0, 200.0, &RatePolicy::fixed(22.0), DEFAULT_PERIOD_CAP)
                .unwrap();

        assert_eq!(schedule.len(), 120);
        assert!(schedule.final_balance() > 0.0);
        assert!(schedule.non_convergent);
        let warning = schedule.warning().unwrap();
        assert_eq!(warning.period_cap, 120);
    }

    #[test]
    fn test_payment_below_interest_grows_balance() {
        let schedule = generate_schedule(10_000.0, 100.0, &RatePolicy::fixed(24.0), 12).unwrap();

        assert_eq!(schedule.len(), 12);
        assert!(schedule.final_balance() > 10_000.0);
        for entry in &schedule.entries {
            assert!(entry.principal < 0.0);
            assert_relative_eq!(entry.principal + entry.interest, entry.payment, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_zero_payment_is_error() {
        let err = generate_schedule(500.0, 0.0, &RatePolicy::fixed(10.0), 120).unwrap_err();
        assert_eq!(err, EngineError::PaymentInsufficient { principal: 500.0 });
    }

    #[test]
    fn test_zero_principal_is_empty_and_paid() {
        let schedule = generate_schedule(0.0, 0.0, &RatePolicy::fixed(10.0), 120).unwrap();
        assert!(schedule.is_empty());
        assert!(schedule.is_paid_off());
    }

    #[test]
    fn test_invalid_inputs_reported_together() {
        let err = generate_schedule(-5.0, -1.0, &RatePolicy::fixed(-2.0), 0).unwrap_err();
        let fields: Vec<_> = err
            .validation_errors()
            .iter()
            .map(|e| e.field.as_str())
            .collect();
        assert_eq!(fields, vec!["principal", "payment", "period_cap", "rate.apr"]);
    }

    #[test]
    fn test_final_payment_is_partial() {
        let schedule = generate_schedule(1000.0, 300.0, &RatePolicy::fixed(0.0), 120).unwrap();

        assert_eq!(schedule.len(), 4);
        assert_eq!(schedule.entries[3].payment, 100.0);
        assert_eq!(schedule.total_paid(), 1000.0);
    }

    #[test]
    fn test_intro_rate_applies_then_expires() {
        let policy = RatePolicy::introductory(0.0, 3, 12.0);
        let schedule = generate_schedule(1000.0, 100.0, &policy, 120).unwrap();

        assert_eq!(schedule.entries[2].interest, 0.0);
        assert_eq!(schedule.entries[2].annual_rate, 0.0);
        assert!((schedule.entries[3].interest - 700.0 * 0.01).abs() < 1e-9);
        assert_eq!(schedule.entries[3].annual_rate, 12.0);
    }

    #[test]
    fn test_term_schedule_matches_closed_form() {
        let schedule = schedule_for_term(10_000.0, &RatePolicy::fixed(12.0), 12).unwrap();

        assert_eq!(schedule.len(), 12);
        assert_eq!(schedule.final_balance(), 0.0);
        let first = schedule.entries[0].payment;
        assert!((first - 888.49).abs() < 0.01);
    }

    #[test]
    fn test_solve_payment_with_intro_period() {
        let policy = RatePolicy::introductory(0.0, 12, 24.0);
        let payment = solve_payment(5000.0, &policy, 24).unwrap();

        // Cheaper than paying 24% throughout, dearer than 0% throughout
        assert!(payment < level_payment(5000.0, 0.02, 24).unwrap());
        assert!(payment > 5000.0 / 24.0);

        let schedule = schedule_for_term(5000.0, &policy, 24).unwrap();
        assert!(schedule.is_paid_off());
        assert!(schedule.len() <= 24);
    }

    #[test]
    fn test_balance_non_increasing_when_payment_covers_interest() {
        let schedule = generate_schedule(8000.0, 250.0, &RatePolicy::fixed(18.0), 120).unwrap();
        assert!(schedule.is_paid_off());

        let mut previous = 8000.0;
        for entry in &schedule.entries {
            assert!(entry.remaining_balance <= previous);
            previous = entry.remaining_balance;
        }
    }

    #[test]
    fn test_large_balance_paid_in_one_period() {
        // At this size one float step exceeds the payoff tolerance
        let principal = 8_653_950_844.47;
        let schedule =
            generate_schedule(principal, 2.0 * principal, &RatePolicy::fixed(18.37), 1).unwrap();
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule.final_balance(), 0.0);
        assert!(!schedule.non_convergent);
        assert_eq!(schedule.entries[0].principal, principal);

        let term = schedule_for_term(8_646_419_948.56, &RatePolicy::fixed(27.37), 1).unwrap();
        assert!(term.is_paid_off());
        assert_eq!(term.len(), 1);
    }

    #[test]
    fn test_rejects_oversized_period_cap() {
        let rate = RatePolicy::fixed(5.0);
        let err = generate_schedule(1_000.0, 100.0, &rate, u32::MAX).unwrap_err();
        assert_eq!(err.validation_errors()[0].field, "period_cap");

        let err = schedule_for_term(1_000.0, &rate, MAX_PERIOD_CAP + 1).unwrap_err();
        assert_eq!(err.validation_errors()[0].field, "period_cap");
    }

    proptest! {
        #[test]
        fn prop_term_schedule_pays_off_exactly(
            principal in 0.0f64..1e12,
            apr in 0.0f64..36.0,
            periods in 1u32..=360,
        ) {
            let schedule = schedule_for_term(principal, &RatePolicy::fixed(apr), periods).unwrap();

            prop_assert!(schedule.len() as u32 <= periods);
            prop_assert!(schedule.final_balance().abs() < TOLERANCE);
            prop_assert!(!schedule.non_convergent);
            let drift = (schedule.total_principal() - principal).abs();
            prop_assert!(drift < TOLERANCE * principal.max(1.0));
        }

        #[test]
        fn prop_schedule_respects_cap(
            principal in 1.0f64..50_000.0,
            payment in 1.0f64..2_000.0,
            apr in 0.0f64..30.0,
            cap in 1u32..=240,
        ) {
            let schedule =
                generate_schedule(principal, payment, &RatePolicy::fixed(apr), cap).unwrap();

            prop_assert!(schedule.len() as u32 <= cap);
            prop_assert_eq!(schedule.is_paid_off(), !schedule.non_convergent);
            for entry in &schedule.entries {
                let split = entry.principal + entry.interest - entry.payment;
                prop_assert!(split.abs() < 1e-9 * entry.payment.max(1.0));
            }
        }

        #[test]
        fn prop_intro_term_schedule_pays_off(
            principal in 100.0f64..50_000.0,
            intro_periods in 0u32..=21,
            regular_apr in 0.0f64..30.0,
            periods in 1u32..=60,
        ) {
            let policy = RatePolicy::introductory(0.0, intro_periods, regular_apr);
            let schedule = schedule_for_term(principal, &policy, periods).unwrap();

            prop_assert!(schedule.is_paid_off());
            prop_assert!(schedule.len() as u32 <= periods);
        }
    }
}
