//! Engine configuration
//!
//! Defaults match the calculators' built-in behavior. A JSON file may
//! override any subset of fields.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::amortization::DEFAULT_PERIOD_CAP;
use crate::error::{EngineError, LoadError};
use crate::simulation::RiskProfile;
use crate::validation::{Validator, MAX_PERIOD_CAP};

/// Percentiles reported by the Monte Carlo simulator
pub const DEFAULT_PERCENTILES: [f64; 5] = [10.0, 25.0, 50.0, 75.0, 90.0];

/// Annual rate volatility per risk profile, in percentage points
///
/// Each simulated year draws `base ± volatility / 2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityTable {
    pub conservative: f64,
    pub moderate: f64,
    pub aggressive: f64,
}

impl VolatilityTable {
    pub fn for_profile(&self, profile: RiskProfile) -> f64 {
        match profile {
            RiskProfile::Conservative => self.conservative,
            RiskProfile::Moderate => self.moderate,
            RiskProfile::Aggressive => self.aggressive,
        }
    }
}

impl Default for VolatilityTable {
    fn default() -> Self {
        Self {
            conservative: 4.0,
            moderate: 10.0,
            aggressive: 20.0,
        }
    }
}

/// Configuration shared by every engine operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of periods any schedule may run
    pub period_cap: u32,

    /// Percentiles (0-100) read from sorted simulation outcomes
    pub percentiles: Vec<f64>,

    /// Rate volatility by risk profile
    pub volatility: VolatilityTable,

    /// Weight of the rate term in the blended payoff score (0-1).
    /// The balance term gets `1 - blend_rate_weight`.
    pub blend_rate_weight: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            period_cap: DEFAULT_PERIOD_CAP,
            percentiles: DEFAULT_PERCENTILES.to_vec(),
            volatility: VolatilityTable::default(),
            blend_rate_weight: 0.5,
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file; missing fields keep their defaults
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let config: Self = serde_json::from_reader(reader)?;
        config.checked()
    }

    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        let config: Self = serde_json::from_str(json)?;
        config.checked()
    }

    fn checked(self) -> Result<Self, LoadError> {
        self.validate().map_err(|e| LoadError::Invalid {
            what: "engine configuration".to_string(),
            reason: e.to_string(),
        })?;
        log::debug!("loaded engine configuration: {:?}", self);
        Ok(self)
    }

    /// Check ranges and the ordering of volatilities
    pub fn validate(&self) -> Result<(), EngineError> {
        let mut v = Validator::new();
        v.positive_count("period_cap", self.period_cap)
            .at_most_count("period_cap", self.period_cap, MAX_PERIOD_CAP)
            .within("blend_rate_weight", self.blend_rate_weight, 0.0, 1.0)
            .non_negative("volatility.conservative", self.volatility.conservative)
            .non_negative("volatility.moderate", self.volatility.moderate)
            .non_negative("volatility.aggressive", self.volatility.aggressive);

        if self.percentiles.is_empty() {
            v.push("percentiles", "must list at least one percentile");
        }
        for (i, p) in self.percentiles.iter().enumerate() {
            v.within(&format!("percentiles[{}]", i), *p, 0.0, 100.0);
        }
        if self.percentiles.windows(2).any(|w| w[0] > w[1]) {
            v.push("percentiles", "must be in ascending order");
        }

        let vol = &self.volatility;
        if vol.conservative > vol.moderate || vol.moderate > vol.aggressive {
            v.push(
                "volatility",
                "must satisfy conservative <= moderate <= aggressive",
            );
        }

        v.finish()
    }
}
