//! Error types returned by the engine
//!
//! Every public calculation returns `Result<_, EngineError>`. Running out of
//! periods before a balance is paid off is not an error; see
//! [`NonConvergent`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single rejected input field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Identifier of the offending input (e.g. `principal`, `balances[2].apr`)
    pub field: String,
    /// Human-readable reason
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors produced by engine calculations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// One or more inputs failed validation; nothing was computed
    #[error("invalid input: {}", join_errors(.0))]
    InvalidInput(Vec<ValidationError>),

    /// A positive balance was given a zero payment
    #[error("payment insufficient to amortize balance of {principal:.2}")]
    PaymentInsufficient { principal: f64 },

    /// Monthly budget does not cover the sum of required payments
    #[error("monthly budget {budget:.2} is below required minimum payments of {required:.2}")]
    InsufficientBudget { budget: f64, required: f64 },
}

impl EngineError {
    /// Shorthand for a single-field validation failure
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidInput(vec![ValidationError::new(field, message)])
    }

    /// Validation errors carried by this error, if any
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            EngineError::InvalidInput(errors) => errors,
            _ => &[],
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Warning attached to a schedule that hit its period cap with a balance left
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NonConvergent {
    pub period_cap: u32,
    pub remaining_balance: f64,
}

impl fmt::Display for NonConvergent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "payment too low to pay off within {} periods ({:.2} remaining)",
            self.period_cap, self.remaining_balance
        )
    }
}

/// Errors from loading configuration or balance files
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid {what}: {reason}")]
    Invalid { what: String, reason: String },
}
