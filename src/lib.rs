//! Financial projection engine for consumer calculators
//!
//! This library provides:
//! - Amortization schedules with fixed or introductory rates
//! - Multi-balance debt payoff (avalanche, snowball, blended)
//! - Compound growth and certificate of deposit projections
//! - Monte Carlo risk simulation with percentile outcomes
//! - Scenario ranking by net benefit against a baseline
//!
//! Every calculation is a pure function of its inputs. Rates are annual
//! percentages (`4.5` means 4.5%).

pub mod amortization;
pub mod balance;
pub mod config;
pub mod engine;
pub mod error;
pub mod growth;
pub mod numeric;
pub mod observer;
pub mod scenario;
pub mod simulation;
pub mod strategy;
pub mod validation;

// Re-export commonly used types
pub use amortization::{RatePolicy, Schedule, ScheduleEntry};
pub use balance::Balance;
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, LoadError, NonConvergent, ValidationError};
pub use growth::{CertificateTerms, GrowthProjection};
pub use observer::{CalculationEvent, CalculationObserver, LoggingObserver};
pub use scenario::{RankedScenario, ScenarioInput, ScenarioRunner};
pub use simulation::{RiskProfile, SimulationInputs, SimulationResult};
pub use strategy::{AllocationPolicy, AllocationResult};
