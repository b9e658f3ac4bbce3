//! Closed-form annuity formulas
//!
//! These are shortcuts only. Where a closed-form payment and the iterative
//! schedule disagree at the boundary, the iterative schedule wins; see
//! [`super::schedule_for_term`].

use crate::error::EngineError;
use crate::numeric::is_negligible;

/// Rates below this are treated as zero to avoid dividing by ~0
const ZERO_RATE: f64 = 1e-12;

/// Level payment that amortizes `principal` over `periods` at `periodic_rate`
///
/// P·r / (1 − (1+r)^−n), or P / n when the rate is zero
pub fn level_payment(principal: f64, periodic_rate: f64, periods: u32) -> Result<f64, EngineError> {
    if periods == 0 {
        return Err(EngineError::invalid("periods", "must be at least 1"));
    }
    if is_negligible(principal) {
        return Ok(0.0);
    }

    if periodic_rate.abs() < ZERO_RATE {
        return Ok(principal / periods as f64);
    }

    let discount = (1.0 + periodic_rate).powi(-(periods as i32));
    Ok(principal * periodic_rate / (1.0 - discount))
}

/// Present value of `periods` payments made at the end of each period
pub fn pv_annuity_ordinary(payment: f64, periods: u32, periodic_rate: f64) -> f64 {
    if periodic_rate.abs() < ZERO_RATE {
        return payment * periods as f64;
    }

    let v = 1.0 / (1.0 + periodic_rate);
    payment * (1.0 - v.powi(periods as i32)) / periodic_rate
}

/// Future value of `periods` payments made at the end of each period
pub fn fv_annuity_ordinary(payment: f64, periods: u32, periodic_rate: f64) -> f64 {
    if periodic_rate.abs() < ZERO_RATE {
        return payment * periods as f64;
    }

    payment * ((1.0 + periodic_rate).powi(periods as i32) - 1.0) / periodic_rate
}

/// Future value of a single deposit
pub fn fv_lump_sum(amount: f64, periods: u32, periodic_rate: f64) -> f64 {
    amount * (1.0 + periodic_rate).powi(periods as i32)
}

/// Number of level payments needed to clear `principal`, `None` when the
/// payment never covers the interest
pub fn periods_to_payoff(principal: f64, payment: f64, periodic_rate: f64) -> Option<f64> {
    if is_negligible(principal) {
        return Some(0.0);
    }
    if payment <= 0.0 {
        return None;
    }
    if periodic_rate.abs() < ZERO_RATE {
        return Some(principal / payment);
    }

    let interest = principal * periodic_rate;
    if payment <= interest {
        return None;
    }

    // n = −ln(1 − P·r / A) / ln(1 + r)
    Some(-(1.0 - interest / payment).ln() / (1.0 + periodic_rate).ln())
}
