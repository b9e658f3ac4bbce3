//! Effective APR of a borrowing scenario
//!
//! The borrower receives `net_proceeds` up front and repays a stream of
//! monthly payments. The effective APR is the monthly rate at which those
//! payments discount back to the proceeds, quoted nominally (monthly x 12)
//! the way lenders quote APR.

use crate::numeric::{is_negligible, MONTHS_PER_YEAR};

const BISECTION_STEPS: u32 = 200;
const RATE_TOLERANCE: f64 = 1e-13;

/// Highest monthly rate searched (1000% a month)
const MONTHLY_RATE_LIMIT: f64 = 10.0;

/// Present value of monthly `payments`, the first due one month out
pub fn present_value(payments: &[f64], monthly_rate: f64) -> f64 {
    let growth = 1.0 + monthly_rate;
    payments
        .iter()
        .scan(1.0, |discount, &payment| {
            *discount /= growth;
            Some(payment * *discount)
        })
        .sum()
}

/// Nominal annual percentage for a loan of `net_proceeds` repaid by `payments`
///
/// A fee-free loan at a fixed APR reproduces that APR. Returns `None` when
/// nothing was borrowed or the payments return less than was borrowed.
pub fn effective_apr_percent(net_proceeds: f64, payments: &[f64]) -> Option<f64> {
    if payments.is_empty() || net_proceeds.is_nan() || net_proceeds <= 0.0 {
        return None;
    }
    let repaid = present_value(payments, 0.0);
    if is_negligible(repaid - net_proceeds) {
        return Some(0.0);
    }
    if repaid < net_proceeds {
        return None;
    }

    // Present value falls as the rate rises; widen until it drops below the proceeds
    let mut low = 0.0;
    let mut high = 0.01;
    while present_value(payments, high) > net_proceeds {
        if high >= MONTHLY_RATE_LIMIT {
            return None;
        }
        low = high;
        high = (high * 2.0).min(MONTHLY_RATE_LIMIT);
    }

    for _ in 0..BISECTION_STEPS {
        if high - low < RATE_TOLERANCE {
            break;
        }
        let mid = 0.5 * (low + high);
        if present_value(payments, mid) > net_proceeds {
            low = mid;
        } else {
            high = mid;
        }
    }

    Some(0.5 * (low + high) * f64::from(MONTHS_PER_YEAR) * 100.0)
}
