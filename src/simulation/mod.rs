//! Monte Carlo risk simulation

mod monte_carlo;
mod risk;

pub use monte_carlo::{
    percentile_index, run_trial, simulate, simulate_seeded, PercentileOutcome, SimulationInputs,
    SimulationResult,
};
pub use risk::RiskProfile;
