//! Errors raised by history sources.

use thiserror::Error;

/// Why a history source could not answer.
///
/// The risk engine never fails a calculation on these: the affected symbol
/// is treated as having no history.
#[derive(Debug, Error)]
pub enum TraitError {
    /// The backing store could not be reached.
    #[error("history source unavailable: {0}")]
    Unavailable(String),

    /// Stored history could not be decoded.
    #[error("malformed history: {0}")]
    ParseError(String),

    /// Reading the backing file failed.
    #[error("IO error: {0}")]
    IoError(String),

    /// History values are outside their domain (e.g. non-positive prices).
    #[error("invalid history: {0}")]
    InvalidInput(String),
}

impl From<std::io::Error> for TraitError {
    fn from(e: std::io::Error) -> Self {
        TraitError::IoError(e.to_string())
    }
}
