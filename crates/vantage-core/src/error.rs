//! Error types for the Vantage domain model.

use thiserror::Error;

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while building or reading domain types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A position carries a value that cannot be used.
    #[error("Invalid position {symbol}: {reason}")]
    InvalidPosition {
        /// Symbol of the offending position.
        symbol: String,
        /// Description of the problem.
        reason: String,
    },

    /// A risk model name was not recognised.
    #[error("Unknown risk model: {0}")]
    UnknownRiskModel(String),

    /// A simulation mode name was not recognised.
    #[error("Unknown simulation mode: {0}")]
    UnknownSimulationMode(String),
}

impl CoreError {
    /// Creates an invalid position error.
    #[must_use]
    pub fn invalid_position(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPosition {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::invalid_position("BTC-USD", "market value is not finite");
        assert_eq!(
            err.to_string(),
            "Invalid position BTC-USD: market value is not finite"
        );
    }
}
