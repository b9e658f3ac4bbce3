//! Input validation
//!
//! Checks are pure functions of the inputs. Each check pushes onto a shared
//! error list so callers see every offending field at once.

use crate::error::{EngineError, ValidationError};

/// Longest schedule any calculation will iterate, in periods (100 years)
pub const MAX_PERIOD_CAP: u32 = 1_200;

/// Longest growth or simulation horizon, in years
pub const MAX_YEARS: u32 = 100;

/// Most Monte Carlo trials per simulation
pub const MAX_RUNS: u32 = 1_000_000;

/// Accumulates validation errors for one input set
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Amount must be finite and >= 0
    pub fn non_negative(&mut self, field: &str, value: f64) -> &mut Self {
        if !value.is_finite() {
            self.push(field, "must be a finite number");
        } else if value < 0.0 {
            self.push(field, "must not be negative");
        }
        self
    }

    /// Amount must be finite and > 0
    pub fn positive(&mut self, field: &str, value: f64) -> &mut Self {
        if !value.is_finite() {
            self.push(field, "must be a finite number");
        } else if value <= 0.0 {
            self.push(field, "must be greater than zero");
        }
        self
    }

    /// Count (periods, years, runs) must be at least one
    pub fn positive_count(&mut self, field: &str, value: u32) -> &mut Self {
        if value == 0 {
            self.push(field, "must be at least 1");
        }
        self
    }

    /// Count must not exceed `max`
    pub fn at_most_count(&mut self, field: &str, value: u32, max: u32) -> &mut Self {
        if value > max {
            self.push(field, &format!("must be at most {}", max));
        }
        self
    }

    /// Value must lie in `[low, high]`
    pub fn within(&mut self, field: &str, value: f64, low: f64, high: f64) -> &mut Self {
        if !value.is_finite() || value < low || value > high {
            self.push(field, &format!("must be between {} and {}", low, high));
        }
        self
    }

    pub fn push(&mut self, field: &str, message: &str) -> &mut Self {
        self.errors.push(ValidationError::new(field, message));
        self
    }

    /// Merge errors from a nested validation, prefixing their fields
    pub fn extend_prefixed(&mut self, prefix: &str, errors: Vec<ValidationError>) -> &mut Self {
        self.errors.extend(errors.into_iter().map(|e| ValidationError {
            field: format!("{}.{}", prefix, e.field),
            message: e.message,
        }));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    /// `Ok(())` when nothing was rejected, otherwise `InvalidInput`
    pub fn finish(self) -> Result<(), EngineError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            log::warn!("rejected input: {} field(s) invalid", self.errors.len());
            Err(EngineError::InvalidInput(self.errors))
        }
    }
}

/// Validate the inputs shared by growth projections and simulations
pub fn growth_inputs(
    initial: f64,
    monthly_contribution: f64,
    annual_rate_percent: f64,
    years: u32,
) -> Validator {
    let mut v = Validator::new();
    v.non_negative("initial", initial)
        .non_negative("monthly_contribution", monthly_contribution)
        .non_negative("annual_rate_percent", annual_rate_percent)
        .positive_count("years", years)
        .at_most_count("years", years, MAX_YEARS);
    v
}
