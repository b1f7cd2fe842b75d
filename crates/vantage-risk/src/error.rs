//! Error types for risk calculations.

use thiserror::Error;
use vantage_math::MathError;

/// A specialized Result type for risk calculations.
pub type RiskResult<T> = Result<T, RiskError>;

/// Errors that can reach the caller of a risk calculation.
///
/// Missing history, a covariance matrix that does not factor and a
/// portfolio with no usable history are not errors: they select a
/// fallback simulation mode instead.
#[derive(Debug, Error)]
pub enum RiskError {
    /// The request or configuration cannot be evaluated.
    #[error("invalid configuration: {field}: {reason}")]
    InvalidConfiguration {
        /// Offending field.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The caller's deadline expired before history was fetched.
    #[error("deadline of {deadline_ms}ms expired while fetching history")]
    Timeout {
        /// Deadline the caller supplied.
        deadline_ms: u64,
    },

    /// Numerical failure that has no fallback.
    #[error("math error: {0}")]
    Math(#[from] MathError),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl RiskError {
    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for errors caused by the caller's input.
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, RiskError::InvalidConfiguration { .. })
    }
}
