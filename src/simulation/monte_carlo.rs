//! Monte Carlo risk simulation of savings growth
//!
//! Each trial draws one annual rate per year, `max(0, base ± volatility / 2)`
//! uniformly, and compounds monthly with the contribution added before each
//! month's growth. Terminal values are sorted and reduced to nearest-rank
//! percentiles (`floor(runs * p / 100)`), never interpolated.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::risk::RiskProfile;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::numeric::{monthly_rate, MONTHS_PER_YEAR};
use crate::validation::{self, MAX_RUNS};

/// Inputs for one simulation request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationInputs {
    pub initial: f64,
    pub monthly_contribution: f64,
    pub base_rate_percent: f64,
    pub years: u32,
    pub risk_profile: RiskProfile,
    pub runs: u32,
}

/// Terminal value at one percentile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileOutcome {
    pub percentile: f64,
    pub value: f64,
}

/// Sorted trial outcomes and their percentile reduction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub risk_profile: RiskProfile,

    /// Full swing of the annual rate draw, in percentage points
    pub volatility: f64,

    pub runs: u32,

    /// Initial deposit plus every contribution
    pub total_deposited: f64,

    /// Terminal value of every trial, ascending
    pub terminal_values: Vec<f64>,

    /// One outcome per configured percentile, ascending
    pub percentiles: Vec<PercentileOutcome>,

    pub mean: f64,
}

impl SimulationResult {
    /// Value at an exact configured percentile
    pub fn value_at(&self, percentile: f64) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|p| p.percentile == percentile)
            .map(|p| p.value)
    }

    pub fn median(&self) -> Option<f64> {
        self.value_at(50.0)
    }

    /// Fraction of trials that end above what was deposited
    pub fn probability_of_gain(&self) -> f64 {
        let gains = self
            .terminal_values
            .iter()
            .filter(|&&v| v > self.total_deposited)
            .count();
        gains as f64 / self.terminal_values.len() as f64
    }
}

fn validate(inputs: &SimulationInputs, config: &EngineConfig) -> Result<(), EngineError> {
    let mut v = validation::growth_inputs(
        inputs.initial,
        inputs.monthly_contribution,
        inputs.base_rate_percent,
        inputs.years,
    );
    v.positive_count("runs", inputs.runs)
        .at_most_count("runs", inputs.runs, MAX_RUNS);
    if let Err(e) = config.validate() {
        v.extend_prefixed("config", e.validation_errors().to_vec());
    }
    v.finish()
}

/// Run a single randomized trial and return its terminal value
pub fn run_trial<R: Rng>(inputs: &SimulationInputs, volatility: f64, rng: &mut R) -> f64 {
    let half = volatility / 2.0;
    let mut balance = inputs.initial;

    for _year in 0..inputs.years {
        let drawn = inputs.base_rate_percent + rng.random_range(-half..=half);
        let rate = monthly_rate(drawn.max(0.0));

        for _month in 0..MONTHS_PER_YEAR {
            balance += inputs.monthly_contribution;
            balance *= 1.0 + rate;
        }
    }

    balance
}

/// Nearest-rank index of `percentile` in `runs` sorted values
pub fn percentile_index(runs: usize, percentile: f64) -> usize {
    let index = (runs as f64 * percentile / 100.0).floor() as usize;
    index.min(runs.saturating_sub(1))
}

/// Simulate with a caller-supplied random source, one trial after another
pub fn simulate<R: Rng>(
    inputs: &SimulationInputs,
    config: &EngineConfig,
    rng: &mut R,
) -> Result<SimulationResult, EngineError> {
    validate(inputs, config)?;

    let volatility = config.volatility.for_profile(inputs.risk_profile);
    let values: Vec<f64> = (0..inputs.runs)
        .map(|_| run_trial(inputs, volatility, rng))
        .collect();

    Ok(reduce(inputs, volatility, values, &config.percentiles))
}

/// Simulate in parallel, seeding each trial from `(seed, trial index)`
///
/// Results depend only on `seed`, not on thread scheduling.
pub fn simulate_seeded(
    inputs: &SimulationInputs,
    config: &EngineConfig,
    seed: u64,
) -> Result<SimulationResult, EngineError> {
    validate(inputs, config)?;

    let volatility = config.volatility.for_profile(inputs.risk_profile);
    let values: Vec<f64> = (0..inputs.runs)
        .into_par_iter()
        .map(|trial| {
            let mut rng = StdRng::seed_from_u64(derive_seed(seed, trial));
            run_trial(inputs, volatility, &mut rng)
        })
        .collect();

    Ok(reduce(inputs, volatility, values, &config.percentiles))
}

fn reduce(
    inputs: &SimulationInputs,
    volatility: f64,
    mut values: Vec<f64>,
    percentiles: &[f64],
) -> SimulationResult {
    values.sort_by(|a, b| a.total_cmp(b));

    let outcomes = percentiles
        .iter()
        .map(|&p| PercentileOutcome {
            percentile: p,
            value: values[percentile_index(values.len(), p)],
        })
        .collect();

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let months = u64::from(inputs.years) * u64::from(MONTHS_PER_YEAR);
    let total_deposited = inputs.initial + inputs.monthly_contribution * months as f64;

    log::debug!(
        "{} simulation: {} runs, median {:.2}, mean {:.2}",
        inputs.risk_profile,
        inputs.runs,
        values[percentile_index(values.len(), 50.0)],
        mean
    );

    SimulationResult {
        risk_profile: inputs.risk_profile,
        volatility,
        runs: inputs.runs,
        total_deposited,
        terminal_values: values,
        percentiles: outcomes,
        mean,
    }
}

fn derive_seed(base_seed: u64, trial: u32) -> u64 {
    splitmix64(base_seed ^ ((trial as u64) << 17) ^ trial as u64)
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
