//! Ranking of precomputed scenarios by net benefit against a baseline

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::effective_rate::effective_apr_percent;
use crate::amortization::Schedule;
use crate::error::EngineError;
use crate::growth::{CertificateOutcome, GrowthSummary};
use crate::numeric::{round_currency, MONTHS_PER_YEAR};
use crate::validation::{Validator, MAX_YEARS};

/// Fees layered on top of a scenario's own cashflows
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeModel {
    /// Charged once up front (transfer fee, account opening fee)
    pub one_time: f64,

    /// Charged every month of the timeline
    pub monthly: f64,
}

impl FeeModel {
    pub fn new(one_time: f64, monthly: f64) -> Self {
        Self { one_time, monthly }
    }
}

/// The precomputed run a scenario is built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioRun {
    Amortization(Schedule),
    Projection(GrowthSummary),
    Certificate(CertificateOutcome),
}

impl ScenarioRun {
    /// Months the scenario's cashflows span
    fn timeline_months(&self) -> u32 {
        match self {
            ScenarioRun::Amortization(schedule) => schedule.len() as u32,
            ScenarioRun::Projection(summary) => summary.years.saturating_mul(MONTHS_PER_YEAR),
            ScenarioRun::Certificate(outcome) => outcome.terms.term_months,
        }
    }

    /// Projection horizons arrive deserialized and bound the month count
    fn validate(&self, prefix: &str, v: &mut Validator) {
        if let ScenarioRun::Projection(summary) = self {
            v.at_most_count(&format!("{}.years", prefix), summary.years, MAX_YEARS);
        }
    }

    fn is_non_convergent(&self) -> bool {
        matches!(self, ScenarioRun::Amortization(s) if s.non_convergent)
    }
}

/// A named scenario to rank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioInput {
    pub name: String,
    pub run: ScenarioRun,
    #[serde(default)]
    pub fees: FeeModel,
}

impl ScenarioInput {
    pub fn new(name: impl Into<String>, run: ScenarioRun, fees: FeeModel) -> Self {
        Self {
            name: name.into(),
            run,
            fees,
        }
    }

    /// Interest paid on debt, or interest earned on savings
    pub fn total_interest(&self) -> f64 {
        match &self.run {
            ScenarioRun::Amortization(schedule) => schedule.total_interest(),
            ScenarioRun::Projection(summary) => summary.total_growth,
            ScenarioRun::Certificate(outcome) => outcome.interest_earned,
        }
    }

    /// Cost of the scenario excluding one-time fees
    ///
    /// Debt: everything paid plus monthly fees. Savings: deposits minus the
    /// ending value plus monthly fees, so a gain is a negative cost.
    pub fn total_cost(&self) -> f64 {
        let monthly_fees = self.fees.monthly * self.run.timeline_months() as f64;
        let base = match &self.run {
            ScenarioRun::Amortization(schedule) => schedule.total_paid(),
            ScenarioRun::Projection(summary) => summary.total_deposited - summary.future_value,
            ScenarioRun::Certificate(outcome) => outcome.deposit - outcome.maturity_value,
        };
        base + monthly_fees
    }

    /// Months to payoff or maturity; `None` for a debt that never clears
    pub fn months(&self) -> Option<u32> {
        match &self.run {
            ScenarioRun::Amortization(schedule) => schedule.months_to_payoff(),
            run => Some(run.timeline_months()),
        }
    }

    /// Effective APR of a debt scenario including its fees
    pub fn effective_apr_percent(&self) -> Option<f64> {
        let ScenarioRun::Amortization(schedule) = &self.run else {
            return None;
        };
        if schedule.is_empty() || schedule.non_convergent {
            return None;
        }

        let payments: Vec<f64> = schedule
            .entries
            .iter()
            .map(|e| e.payment + self.fees.monthly)
            .collect();
        effective_apr_percent(schedule.principal - self.fees.one_time, &payments)
    }
}

/// One scenario's position in the ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedScenario {
    /// 1-based position, best first
    pub rank: u32,
    pub name: String,
    pub total_interest: f64,
    pub total_cost: f64,
    pub one_time_fees: f64,
    pub months: Option<u32>,

    /// `baseline.total_cost - total_cost - one_time_fees`
    pub net_benefit: f64,

    pub effective_apr_percent: Option<f64>,
    pub non_convergent: bool,
}

fn validate(scenarios: &[ScenarioInput], baseline_index: usize) -> Result<(), EngineError> {
    let mut v = Validator::new();
    if scenarios.is_empty() {
        v.push("scenarios", "must contain at least one scenario");
    } else if baseline_index >= scenarios.len() {
        v.push(
            "baseline_index",
            &format!("must be below the number of scenarios ({})", scenarios.len()),
        );
    }
    for (i, scenario) in scenarios.iter().enumerate() {
        let prefix = format!("scenarios[{}]", i);
        v.non_negative(&format!("{}.fees.one_time", prefix), scenario.fees.one_time)
            .non_negative(&format!("{}.fees.monthly", prefix), scenario.fees.monthly);
        scenario.run.validate(&format!("{}.run", prefix), &mut v);
    }
    v.finish()
}

/// Best first: convergent before non-convergent, then higher net benefit
/// (to the cent), then shorter timeline
fn ranking_order(a: &RankedScenario, b: &RankedScenario) -> Ordering {
    a.non_convergent
        .cmp(&b.non_convergent)
        .then_with(|| round_currency(b.net_benefit).total_cmp(&round_currency(a.net_benefit)))
        .then_with(|| match (a.months, b.months) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

/// Rank `scenarios` by net benefit relative to `scenarios[baseline_index]`
///
/// The baseline is ranked alongside the others. Ties keep input order.
pub fn compare(
    scenarios: &[ScenarioInput],
    baseline_index: usize,
) -> Result<Vec<RankedScenario>, EngineError> {
    validate(scenarios, baseline_index)?;

    let baseline_cost = scenarios[baseline_index].total_cost();

    let mut ranked: Vec<RankedScenario> = scenarios
        .iter()
        .map(|s| {
            let total_cost = s.total_cost();
            RankedScenario {
                rank: 0,
                name: s.name.clone(),
                total_interest: s.total_interest(),
                total_cost,
                one_time_fees: s.fees.one_time,
                months: s.months(),
                net_benefit: baseline_cost - total_cost - s.fees.one_time,
                effective_apr_percent: s.effective_apr_percent(),
                non_convergent: s.run.is_non_convergent(),
            }
        })
        .collect();

    ranked.sort_by(ranking_order);
    for (i, r) in ranked.iter_mut().enumerate() {
        r.rank = i as u32 + 1;
    }

    if let Some(best) = ranked.first() {
        log::debug!(
            "ranked {} scenarios against '{}': best '{}' ({:.2})",
            ranked.len(),
            scenarios[baseline_index].name,
            best.name,
            best.net_benefit
        );
    }

    Ok(ranked)
}
