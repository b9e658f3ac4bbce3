//! Scenario runner for competing offers
//!
//! Builds scenario inputs from named debt, savings or certificate offers
//! using one engine configuration, then ranks them.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::comparator::{compare, FeeModel, RankedScenario, ScenarioInput, ScenarioRun};
use crate::amortization::{generate_schedule, RatePolicy};
use crate::config::EngineConfig;
use crate::error::{EngineError, LoadError};
use crate::growth::{project, project_certificate, CertificateTerms};
use crate::numeric::percent_to_rate;

/// A way to pay down an existing balance (stay put, transfer, consolidate)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtOffer {
    pub name: String,
    pub rate: RatePolicy,

    /// Level monthly payment
    pub payment: f64,

    /// Transfer fee as a percentage of the balance moved
    #[serde(default)]
    pub transfer_fee_percent: f64,

    #[serde(default)]
    pub flat_fee: f64,

    #[serde(default)]
    pub monthly_fee: f64,
}

impl DebtOffer {
    pub fn new(name: impl Into<String>, rate: RatePolicy, payment: f64) -> Self {
        Self {
            name: name.into(),
            rate,
            payment,
            transfer_fee_percent: 0.0,
            flat_fee: 0.0,
            monthly_fee: 0.0,
        }
    }

    pub fn with_transfer_fee(mut self, percent: f64) -> Self {
        self.transfer_fee_percent = percent;
        self
    }

    fn fees(&self, principal: f64) -> FeeModel {
        FeeModel::new(
            principal * percent_to_rate(self.transfer_fee_percent) + self.flat_fee,
            self.monthly_fee,
        )
    }
}

/// A savings account offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsOffer {
    pub name: String,
    pub annual_rate_percent: f64,
    #[serde(default)]
    pub fees: FeeModel,
}

impl SavingsOffer {
    pub fn new(name: impl Into<String>, annual_rate_percent: f64) -> Self {
        Self {
            name: name.into(),
            annual_rate_percent,
            fees: FeeModel::default(),
        }
    }
}

/// A certificate of deposit offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateOffer {
    pub name: String,
    pub terms: CertificateTerms,
    #[serde(default)]
    pub fees: FeeModel,
}

/// The offers to compare and what they are applied to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OfferSet {
    Debt {
        principal: f64,
        offers: Vec<DebtOffer>,
    },
    Savings {
        initial: f64,
        monthly_contribution: f64,
        years: u32,
        offers: Vec<SavingsOffer>,
    },
    Certificate {
        deposit: f64,
        offers: Vec<CertificateOffer>,
    },
}

/// A comparison request as read from a JSON file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRequest {
    /// Index of the offer the others are measured against
    #[serde(default)]
    pub baseline_index: usize,

    #[serde(flatten)]
    pub offers: OfferSet,
}

impl ComparisonRequest {
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Runs comparisons under one engine configuration
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(EngineConfig::default());
/// let offers = vec![
///     DebtOffer::new("current card", RatePolicy::fixed(24.0), 250.0),
///     DebtOffer::new("transfer", RatePolicy::introductory(0.0, 18, 21.0), 250.0)
///         .with_transfer_fee(3.0),
/// ];
/// let ranked = runner.compare_debt_offers(5_000.0, &offers, 0)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    config: EngineConfig,
}

impl ScenarioRunner {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Amortize `principal` under each offer
    pub fn debt_scenarios(
        &self,
        principal: f64,
        offers: &[DebtOffer],
    ) -> Result<Vec<ScenarioInput>, EngineError> {
        offers
            .par_iter()
            .map(|offer| {
                let cap = self.config.period_cap;
                let schedule = generate_schedule(principal, offer.payment, &offer.rate, cap)?;
                Ok(ScenarioInput::new(
                    offer.name.clone(),
                    ScenarioRun::Amortization(schedule),
                    offer.fees(principal),
                ))
            })
            .collect()
    }

    /// Project the same deposits under each savings offer
    pub fn savings_scenarios(
        &self,
        initial: f64,
        monthly_contribution: f64,
        years: u32,
        offers: &[SavingsOffer],
    ) -> Result<Vec<ScenarioInput>, EngineError> {
        offers
            .iter()
            .map(|offer| {
                let projection =
                    project(initial, monthly_contribution, offer.annual_rate_percent, years, 0.0)?;
                Ok(ScenarioInput::new(
                    offer.name.clone(),
                    ScenarioRun::Projection(projection.summary),
                    offer.fees,
                ))
            })
            .collect()
    }

    pub fn certificate_scenarios(
        &self,
        deposit: f64,
        offers: &[CertificateOffer],
    ) -> Result<Vec<ScenarioInput>, EngineError> {
        offers
            .iter()
            .map(|offer| {
                let outcome = project_certificate(deposit, &offer.terms)?;
                Ok(ScenarioInput::new(
                    offer.name.clone(),
                    ScenarioRun::Certificate(outcome),
                    offer.fees,
                ))
            })
            .collect()
    }

    pub fn compare_debt_offers(
        &self,
        principal: f64,
        offers: &[DebtOffer],
        baseline_index: usize,
    ) -> Result<Vec<RankedScenario>, EngineError> {
        compare(&self.debt_scenarios(principal, offers)?, baseline_index)
    }

    pub fn compare_savings_offers(
        &self,
        initial: f64,
        monthly_contribution: f64,
        years: u32,
        offers: &[SavingsOffer],
        baseline_index: usize,
    ) -> Result<Vec<RankedScenario>, EngineError> {
        let scenarios = self.savings_scenarios(initial, monthly_contribution, years, offers)?;
        compare(&scenarios, baseline_index)
    }

    pub fn compare_certificate_offers(
        &self,
        deposit: f64,
        offers: &[CertificateOffer],
        baseline_index: usize,
    ) -> Result<Vec<RankedScenario>, EngineError> {
        compare(&self.certificate_scenarios(deposit, offers)?, baseline_index)
    }

    /// Run whichever comparison `request` describes
    pub fn run(&self, request: &ComparisonRequest) -> Result<Vec<RankedScenario>, EngineError> {
        let baseline = request.baseline_index;
        match &request.offers {
            OfferSet::Debt { principal, offers } => {
                self.compare_debt_offers(*principal, offers, baseline)
            }
            OfferSet::Savings {
                initial,
                monthly_contribution,
                years,
                offers,
            } => self.compare_savings_offers(
                *initial,
                *monthly_contribution,
                *years,
                offers,
                baseline,
            ),
            OfferSet::Certificate { deposit, offers } => {
                self.compare_certificate_offers(*deposit, offers, baseline)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_transfer_comparison() {
        let runner = ScenarioRunner::default();
        let offers = vec![
            DebtOffer::new("current card", RatePolicy::fixed(24.0), 250.0),
            DebtOffer::new("transfer", RatePolicy::introductory(0.0, 18, 21.0), 250.0)
                .with_transfer_fee(3.0),
        ];
        let ranked = runner.compare_debt_offers(5_000.0, &offers, 0).unwrap();

        assert_eq!(ranked[0].name, "transfer");
        assert!((ranked[0].one_time_fees - 150.0).abs() < 1e-9);
        assert!(ranked[0].net_benefit > 0.0);
        assert!(ranked[0].months.unwrap() < ranked[1].months.unwrap());
    }

    #[test]
    fn test_savings_offers_rank_by_rate() {
        let runner = ScenarioRunner::default();
        let offers = vec![
            SavingsOffer::new("traditional", 0.5),
            SavingsOffer::new("high yield", 4.5),
            SavingsOffer::new("money market", 3.0),
        ];
        let ranked = runner
            .compare_savings_offers(5_000.0, 200.0, 5, &offers, 0)
            .unwrap();

        let names: Vec<_> = ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["high yield", "money market", "traditional"]);
        assert_eq!(ranked[2].net_benefit, 0.0);
    }

    #[test]
    fn test_request_from_json() {
        let json = r#"{
            "kind": "certificate",
            "baseline_index": 1,
            "deposit": 10000.0,
            "offers": [
                {"name": "12 month", "terms": {"apy_percent": 5.0, "term_months": 12}},
                {"name": "savings", "terms": {"apy_percent": 0.5, "term_months": 12}}
            ]
        }"#;
        let request: ComparisonRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.baseline_index, 1);

        let ranked = ScenarioRunner::default().run(&request).unwrap();
        assert_eq!(ranked[0].name, "12 month");
        assert!((ranked[0].net_benefit - 450.0).abs() < 1e-6);
    }

    #[test]
    fn test_debt_request_from_json() {
        let json = r#"{
            "kind": "debt",
            "principal": 3000.0,
            "offers": [
                {"name": "card", "rate": {"fixed": {"apr": 19.9}}, "payment": 150.0},
                {"name": "loan", "rate": {"fixed": {"apr": 9.0}}, "payment": 150.0, "flat_fee": 50.0}
            ]
        }"#;
        let request: ComparisonRequest = serde_json::from_str(json).unwrap();
        let ranked = ScenarioRunner::default().run(&request).unwrap();
        assert_eq!(ranked[0].name, "loan");
        assert!(ranked[0].effective_apr_percent.unwrap() > 9.0);
    }

    #[test]
    fn test_invalid_offer_propagates() {
        let offers = vec![DebtOffer::new("bad", RatePolicy::fixed(-1.0), 100.0)];
        let err = ScenarioRunner::default()
            .compare_debt_offers(1_000.0, &offers, 0)
            .unwrap_err();
        assert!(!err.validation_errors().is_empty());
    }
}
