//! Certificate of deposit projection
//!
//! CD rates are quoted as APY, so growth is `(1 + apy)^(months / 12)`
//! regardless of the bank's compounding frequency.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::numeric::{percent_to_rate, MONTHS_PER_YEAR};
use crate::validation::Validator;

/// Terms offered by one bank
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CertificateTerms {
    /// Annual percentage yield
    pub apy_percent: f64,

    /// Term length in months
    pub term_months: u32,

    /// Early withdrawal penalty, in months of interest
    #[serde(default)]
    pub penalty_months: u32,
}

impl CertificateTerms {
    pub fn new(apy_percent: f64, term_months: u32, penalty_months: u32) -> Self {
        Self {
            apy_percent,
            term_months,
            penalty_months,
        }
    }

    fn validate(&self, deposit: f64) -> Result<(), EngineError> {
        let mut v = Validator::new();
        v.non_negative("deposit", deposit)
            .non_negative("apy_percent", self.apy_percent)
            .positive_count("term_months", self.term_months);
        v.finish()
    }

    fn growth_factor(&self, months: u32) -> f64 {
        (1.0 + percent_to_rate(self.apy_percent)).powf(months as f64 / MONTHS_PER_YEAR as f64)
    }

    /// One month of interest on the deposit at this APY
    fn monthly_interest(&self, deposit: f64) -> f64 {
        deposit * (self.growth_factor(1) - 1.0)
    }
}

/// Result of holding a CD to maturity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CertificateOutcome {
    pub deposit: f64,
    pub terms: CertificateTerms,
    pub maturity_value: f64,
    pub interest_earned: f64,

    /// Penalty charged for withdrawing before maturity
    pub early_withdrawal_penalty: f64,
}

/// Project a CD held to maturity
pub fn project_certificate(
    deposit: f64,
    terms: &CertificateTerms,
) -> Result<CertificateOutcome, EngineError> {
    terms.validate(deposit)?;

    let maturity_value = deposit * terms.growth_factor(terms.term_months);

    Ok(CertificateOutcome {
        deposit,
        terms: *terms,
        maturity_value,
        interest_earned: maturity_value - deposit,
        early_withdrawal_penalty: terms.monthly_interest(deposit) * terms.penalty_months as f64,
    })
}

/// Amount received when closing the CD after `month` months
///
/// Before maturity the penalty is deducted from accrued value, but never
/// below the original deposit.
pub fn early_withdrawal_value(
    deposit: f64,
    terms: &CertificateTerms,
    month: u32,
) -> Result<f64, EngineError> {
    terms.validate(deposit)?;

    if month >= terms.term_months {
        return Ok(deposit * terms.growth_factor(terms.term_months));
    }

    let accrued = deposit * terms.growth_factor(month);
    let penalty = terms.monthly_interest(deposit) * terms.penalty_months as f64;
    Ok((accrued - penalty).max(deposit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_one_year_cd() {
        let outcome = project_certificate(10_000.0, &CertificateTerms::new(5.0, 12, 3)).unwrap();
        assert_relative_eq!(outcome.maturity_value, 10_500.0, epsilon = 1e-9);
        assert_relative_eq!(outcome.interest_earned, 500.0, epsilon = 1e-9);
        assert!(outcome.early_withdrawal_penalty > 0.0);
    }

    #[test]
    fn test_multi_year_cd() {
        let outcome = project_certificate(10_000.0, &CertificateTerms::new(4.0, 36, 6)).unwrap();
        assert_relative_eq!(outcome.maturity_value, 10_000.0 * 1.04_f64.powi(3), epsilon = 1e-9);
    }

    #[test]
    fn test_early_withdrawal_never_below_deposit() {
        let terms = CertificateTerms::new(5.0, 24, 6);

        // Month 2: accrued interest is less than the 6-month penalty
        assert_eq!(early_withdrawal_value(10_000.0, &terms, 2).unwrap(), 10_000.0);

        // Month 18: penalty comes out of accrued interest
        let value = early_withdrawal_value(10_000.0, &terms, 18).unwrap();
        assert!(value > 10_000.0);
        assert!(value < 10_000.0 * 1.05_f64.powf(1.5));

        // At maturity no penalty applies
        let maturity = project_certificate(10_000.0, &terms).unwrap().maturity_value;
        assert_eq!(early_withdrawal_value(10_000.0, &terms, 30).unwrap(), maturity);
    }

    #[test]
    fn test_rejects_zero_term() {
        let err = project_certificate(1_000.0, &CertificateTerms::new(4.0, 0, 0)).unwrap_err();
        assert_eq!(err.validation_errors()[0].field, "term_months");
    }
}
