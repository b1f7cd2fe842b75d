//! CLI error types.

use std::path::PathBuf;

use thiserror::Error;
use vantage_config::ConfigError;
use vantage_core::CoreError;
use vantage_risk::RiskError;
use vantage_traits::TraitError;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Input file does not exist.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Portfolio file could not be understood.
    #[error("Invalid portfolio file {}: {message}", .path.display())]
    InvalidPortfolio {
        /// Portfolio file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// Invalid argument value.
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] CoreError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// History could not be loaded.
    #[error("History error: {0}")]
    History(#[from] TraitError),

    /// Calculation error.
    #[error("Calculation error: {0}")]
    Calculation(#[from] RiskError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
