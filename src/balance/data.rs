//! Balance records: debts being paid down or goals being funded

use serde::{Deserialize, Serialize};

use crate::amortization::RatePolicy;
use crate::validation::Validator;

/// A single balance owned by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    /// Unique identifier within one allocation request
    pub id: String,

    /// Outstanding principal
    pub principal: f64,

    /// Rate charged on the balance
    pub rate: RatePolicy,

    /// Minimum payment required each period
    pub minimum_payment: f64,

    /// Payment the owner chose instead of the minimum
    #[serde(default)]
    pub elected_payment: Option<f64>,
}

impl Balance {
    /// Create a fixed-rate balance
    pub fn new(id: impl Into<String>, principal: f64, apr: f64, minimum_payment: f64) -> Self {
        Self {
            id: id.into(),
            principal,
            rate: RatePolicy::fixed(apr),
            minimum_payment,
            elected_payment: None,
        }
    }

    pub fn with_rate(mut self, rate: RatePolicy) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_elected_payment(mut self, payment: f64) -> Self {
        self.elected_payment = Some(payment);
        self
    }

    pub fn set_principal(&mut self, principal: f64) {
        self.principal = principal;
    }

    pub fn set_elected_payment(&mut self, payment: Option<f64>) {
        self.elected_payment = payment;
    }

    /// Payment reserved for this balance every period
    pub fn base_payment(&self) -> f64 {
        self.elected_payment.unwrap_or(self.minimum_payment)
    }

    /// Long-term APR used when ranking balances
    pub fn apr(&self) -> f64 {
        self.rate.regular_apr()
    }

    pub fn is_open(&self) -> bool {
        self.principal > 0.0
    }

    /// Validate this balance, prefixing every field with `prefix`
    pub fn validate(&self, prefix: &str, v: &mut Validator) {
        if self.id.trim().is_empty() {
            v.push(&format!("{}.id", prefix), "must not be empty");
        }
        v.non_negative(&format!("{}.principal", prefix), self.principal)
            .non_negative(&format!("{}.minimum_payment", prefix), self.minimum_payment);
        self.rate.validate(&format!("{}.rate", prefix), v);

        if let Some(elected) = self.elected_payment {
            let field = format!("{}.elected_payment", prefix);
            v.non_negative(&field, elected);
            if elected.is_finite() && elected < self.minimum_payment {
                v.push(&field, "must not be below the minimum payment");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_payment_prefers_election() {
        let card = Balance::new("visa", 4000.0, 19.99, 80.0);
        assert_eq!(card.base_payment(), 80.0);

        let card = card.with_elected_payment(150.0);
        assert_eq!(card.base_payment(), 150.0);
    }

    #[test]
    fn test_apr_uses_regular_rate() {
        let transfer = Balance::new("transfer", 6000.0, 0.0, 60.0)
            .with_rate(RatePolicy::introductory(0.0, 18, 21.5));
        assert_eq!(transfer.apr(), 21.5);
    }

    #[test]
    fn test_updates() {
        let mut loan = Balance::new("car", 9000.0, 6.5, 250.0);
        loan.set_principal(8500.0);
        loan.set_elected_payment(Some(300.0));
        assert_eq!(loan.principal, 8500.0);
        assert_eq!(loan.base_payment(), 300.0);

        loan.set_principal(0.0);
        assert!(!loan.is_open());
    }

    #[test]
    fn test_validate_elected_below_minimum() {
        let bad = Balance::new("", 1000.0, 15.0, 50.0).with_elected_payment(20.0);
        let mut v = Validator::new();
        bad.validate("balances[0]", &mut v);

        let fields: Vec<_> = v.into_errors().into_iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["balances[0].id", "balances[0].elected_payment"]
        );
    }
}
