//! Numeric primitives shared by every calculator
//!
//! Rates enter the engine as annual percentages (`4.5` means 4.5%) and are
//! converted here to fractional per-period rates.

/// Floating tolerance below which a balance is considered paid off
pub const TOLERANCE: f64 = 1e-6;

/// Periods per year for monthly compounding
pub const MONTHS_PER_YEAR: u32 = 12;

/// Convert a percentage to a fraction (4.5 -> 0.045)
pub fn percent_to_rate(percent: f64) -> f64 {
    percent / 100.0
}

/// Convert an annual percentage rate to a monthly fractional rate
pub fn monthly_rate(annual_percent: f64) -> f64 {
    percent_to_rate(annual_percent) / MONTHS_PER_YEAR as f64
}

/// Round to cents, half away from zero
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

pub fn clamp_non_negative(value: f64) -> f64 {
    value.max(0.0)
}

/// True when `value` is within [`TOLERANCE`] of zero
pub fn is_negligible(value: f64) -> bool {
    value.abs() < TOLERANCE
}

/// Snap balances within tolerance of zero to exactly zero
pub fn snap_to_zero(value: f64) -> f64 {
    if is_negligible(value) {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rate_conversions() {
        assert_relative_eq!(percent_to_rate(4.5), 0.045);
        assert_relative_eq!(monthly_rate(12.0), 0.01);
        assert_eq!(monthly_rate(0.0), 0.0);
    }

    #[test]
    fn test_round_currency() {
        assert_eq!(round_currency(10.004), 10.0);
        assert_eq!(round_currency(10.006), 10.01);
        assert_eq!(round_currency(-3.336), -3.34);
    }

    #[test]
    fn test_snap_to_zero() {
        assert_eq!(snap_to_zero(5e-7), 0.0);
        assert_eq!(snap_to_zero(-5e-7), 0.0);
        assert_eq!(snap_to_zero(0.01), 0.01);
        assert_eq!(clamp_non_negative(-2.0), 0.0);
    }
}
