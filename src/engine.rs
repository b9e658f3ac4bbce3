//! Engine facade
//!
//! Holds one [`EngineConfig`] and runs every calculation under it, timing
//! each call for the optional observer.

use rand::Rng;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::amortization::{self, RatePolicy, Schedule};
use crate::balance::Balance;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::growth::{self, CertificateOutcome, CertificateTerms, GrowthProjection};
use crate::observer::{CalculationEvent, CalculationKind, CalculationObserver};
use crate::scenario::{self, ComparisonRequest, RankedScenario, ScenarioInput, ScenarioRunner};
use crate::simulation::{self, SimulationInputs, SimulationResult};
use crate::strategy::{self, AllocationPolicy, AllocationResult};

/// Projection engine bound to a configuration
#[derive(Clone, Default)]
pub struct Engine {
    config: EngineConfig,
    observer: Option<Arc<dyn CalculationObserver>>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Engine {
    /// Create an engine, rejecting an invalid configuration
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            observer: None,
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn CalculationObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn observed<T>(
        &self,
        kind: CalculationKind,
        run: impl FnOnce() -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let start = Instant::now();
        let result = run();
        if let Some(observer) = &self.observer {
            observer.calculation_completed(&CalculationEvent {
                kind,
                elapsed: start.elapsed(),
                succeeded: result.is_ok(),
            });
        }
        result
    }

    /// Schedule for a fixed payment, bounded by the configured period cap
    pub fn schedule(
        &self,
        principal: f64,
        payment: f64,
        rate: &RatePolicy,
    ) -> Result<Schedule, EngineError> {
        self.observed(CalculationKind::Schedule, || {
            amortization::generate_schedule(principal, payment, rate, self.config.period_cap)
        })
    }

    /// Schedule that pays `principal` off in exactly `periods` level payments
    pub fn schedule_for_term(
        &self,
        principal: f64,
        rate: &RatePolicy,
        periods: u32,
    ) -> Result<Schedule, EngineError> {
        self.observed(CalculationKind::Schedule, || {
            amortization::schedule_for_term(principal, rate, periods)
        })
    }

    pub fn allocate(
        &self,
        balances: &[Balance],
        monthly_budget: f64,
        policy: AllocationPolicy,
    ) -> Result<AllocationResult, EngineError> {
        self.observed(CalculationKind::Allocation, || {
            strategy::allocate(balances, monthly_budget, policy, &self.config)
        })
    }

    /// Allocate under every policy
    pub fn allocate_all(
        &self,
        balances: &[Balance],
        monthly_budget: f64,
    ) -> Result<Vec<AllocationResult>, EngineError> {
        self.observed(CalculationKind::Allocation, || {
            strategy::allocate_all(balances, monthly_budget, &self.config)
        })
    }

    pub fn project(
        &self,
        initial: f64,
        monthly_contribution: f64,
        annual_rate_percent: f64,
        years: u32,
        inflation_percent: f64,
    ) -> Result<GrowthProjection, EngineError> {
        self.observed(CalculationKind::Projection, || {
            growth::project(
                initial,
                monthly_contribution,
                annual_rate_percent,
                years,
                inflation_percent,
            )
        })
    }

    pub fn certificate(
        &self,
        deposit: f64,
        terms: &CertificateTerms,
    ) -> Result<CertificateOutcome, EngineError> {
        self.observed(CalculationKind::Certificate, || {
            growth::project_certificate(deposit, terms)
        })
    }

    /// Simulate with a caller-supplied random source
    pub fn simulate<R: Rng>(
        &self,
        inputs: &SimulationInputs,
        rng: &mut R,
    ) -> Result<SimulationResult, EngineError> {
        self.observed(CalculationKind::Simulation, || {
            simulation::simulate(inputs, &self.config, rng)
        })
    }

    /// Simulate in parallel with reproducible per-trial seeds
    pub fn simulate_seeded(
        &self,
        inputs: &SimulationInputs,
        seed: u64,
    ) -> Result<SimulationResult, EngineError> {
        self.observed(CalculationKind::Simulation, || {
            simulation::simulate_seeded(inputs, &self.config, seed)
        })
    }

    pub fn compare(
        &self,
        scenarios: &[ScenarioInput],
        baseline_index: usize,
    ) -> Result<Vec<RankedScenario>, EngineError> {
        self.observed(CalculationKind::Comparison, || {
            scenario::compare(scenarios, baseline_index)
        })
    }

    /// Build and rank the offers in `request`
    pub fn compare_offers(
        &self,
        request: &ComparisonRequest,
    ) -> Result<Vec<RankedScenario>, EngineError> {
        self.observed(CalculationKind::Comparison, || {
            ScenarioRunner::new(self.config.clone()).run(request)
        })
    }
}
