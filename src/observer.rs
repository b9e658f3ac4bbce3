//! Usage tracking hook
//!
//! The engine reports each completed calculation to an observer. Observers
//! see what ran and how long it took, never the inputs or results.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Which engine operation completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationKind {
    Schedule,
    Allocation,
    Projection,
    Certificate,
    Simulation,
    Comparison,
}

impl CalculationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationKind::Schedule => "schedule",
            CalculationKind::Allocation => "allocation",
            CalculationKind::Projection => "projection",
            CalculationKind::Certificate => "certificate",
            CalculationKind::Simulation => "simulation",
            CalculationKind::Comparison => "comparison",
        }
    }
}

impl fmt::Display for CalculationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculationEvent {
    pub kind: CalculationKind,
    pub elapsed: Duration,

    /// False when the calculation returned an error
    pub succeeded: bool,
}

/// Receives an event after every engine calculation
pub trait CalculationObserver: Send + Sync {
    fn calculation_completed(&self, event: &CalculationEvent);
}

/// Writes one `info` record per calculation
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl CalculationObserver for LoggingObserver {
    fn calculation_completed(&self, event: &CalculationEvent) {
        if event.succeeded {
            log::info!("{} completed in {:?}", event.kind, event.elapsed);
        } else {
            log::info!("{} rejected after {:?}", event.kind, event.elapsed);
        }
    }
}
