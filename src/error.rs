//! Error types shared by the simulation core, configuration, and export.

use thiserror::Error;

/// Errors raised by the simulator.
///
/// Every variant is a configuration or programming error: the simulation is
/// deterministic given its random source, so nothing here is retried.
#[derive(Debug, Error)]
pub enum SimError {
    /// An hour-of-day index outside `0..=23` was queried.
    #[error("hour index {hour} out of range (expected 0..=23)")]
    OutOfRange { hour: usize },

    /// A parameter or table failed validation before the run started.
    #[error("invalid configuration: {field} — {message}")]
    InvalidConfiguration { field: String, message: String },

    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// Shorthand for an [`SimError::InvalidConfiguration`] on `field`.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            message: message.into(),
        }
    }
}
