//! Error types for habitcal.
//!
//! The expansion engine itself never fails; these errors come from the
//! surrounding layers (configuration, schedule validation, stores).

use thiserror::Error;

/// Errors that can occur in habitcal operations.
#[derive(Error, Debug)]
pub enum HabitCalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid schedule for '{owner}': {reason}")]
    InvalidSchedule { owner: String, reason: String },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for habitcal operations.
pub type HabitCalResult<T> = Result<T, HabitCalError>;
