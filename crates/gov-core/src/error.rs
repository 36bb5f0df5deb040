//! Error types for the governance engine.

use thiserror::Error;

/// Errors raised while validating or loading simulation parameters.
///
/// Non-convergence is not an error: it is reported through
/// [`gov_records::RunOutcome::MaxStepsReached`].
#[derive(Debug, Error)]
pub enum GovernanceError {
    /// Malformed or out-of-range configuration, caught before any state is built
    #[error("invalid parameter `{parameter}`: {reason}")]
    InvalidParameter { parameter: String, reason: String },

    /// Configuration file could not be read or parsed
    #[error("config error: {0}")]
    Config(String),
}

impl GovernanceError {
    /// Creates an invalid-parameter error.
    pub fn invalid(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }
}

pub type Result<T> = std::result::Result<T, GovernanceError>;

/// Rejects values outside `[0, 1]`, including NaN.
pub(crate) fn check_unit_interval(parameter: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GovernanceError::invalid(
            parameter,
            format!("{} is outside [0, 1]", value),
        ))
    }
}

/// Rejects zero, negative, and non-finite values.
pub(crate) fn check_positive(parameter: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GovernanceError::invalid(
            parameter,
            format!("{} must be a positive finite number", value),
        ))
    }
}
