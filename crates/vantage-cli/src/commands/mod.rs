//! CLI command implementations.

pub mod config;
pub mod var;

pub use config::ConfigArgs;
pub use var::VarArgs;

use std::path::{Path, PathBuf};

use vantage_config::{RiskConfig, Validate};

use crate::error::{CliError, CliResult};

/// Loads the engine configuration: the TOML file if given, else the
/// standard preset, then `VANTAGE_*` environment overrides.
pub fn load_risk_config(path: Option<&Path>) -> CliResult<RiskConfig> {
    let mut config = match path {
        Some(path) => RiskConfig::from_file(existing(path)?)?,
        None => RiskConfig::standard(),
    };
    config.apply_env()?;
    Ok(config)
}

/// Loads and validates the engine configuration.
pub fn load_valid_risk_config(path: Option<&Path>) -> CliResult<RiskConfig> {
    let config = load_risk_config(path)?;
    config.validate_or_error()?;
    Ok(config)
}

/// Fails with [`CliError::FileNotFound`] unless `path` exists.
pub fn existing(path: &Path) -> CliResult<&Path> {
    if path.exists() {
        Ok(path)
    } else {
        Err(CliError::FileNotFound(PathBuf::from(path)))
    }
}
