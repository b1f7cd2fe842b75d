//! Server configuration.

use std::ffi::OsString;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use vantage_config::{ConfigError, ConfigResult, RiskConfig, Validate};

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Historical returns file (CSV or JSON)
    pub returns_file: Option<String>,

    /// Treat the returns file as prices
    #[serde(default)]
    pub returns_are_prices: bool,

    /// Engine defaults
    #[serde(default)]
    pub risk: RiskConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            returns_file: None,
            returns_are_prices: false,
            risk: RiskConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file.
    ///
    /// `VANTAGE_*` environment variables override the `[risk]` table, and
    /// the result is validated.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        Self::from_file_with(path, |key| std::env::var_os(key))
    }

    /// Load configuration from `path` if it exists, else start from the
    /// defaults. Environment overrides and validation apply either way.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        Self::load_with(path, |key| std::env::var_os(key))
    }

    fn load_with<F>(path: impl AsRef<Path>, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let path = path.as_ref();
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            return Self::from_file_with(path, lookup);
        }

        info!("No configuration at {}, using defaults", path.display());
        Self::default().finish(lookup)
    }

    fn from_file_with<F>(path: impl AsRef<Path>, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Self = toml::from_str(&content)?;
        config.finish(lookup)
    }

    fn finish<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        self.risk.apply_lookup(lookup)?;
        self.risk.validate_or_error()?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert!(config.returns_file.is_none());
        assert_eq!(config.risk.default_simulation_count, 10_000);
    }

    #[test]
    fn test_from_file_with_risk_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        std::fs::write(
            &path,
            r#"
            port = 9000
            returns_file = "data/returns.csv"

            [risk]
            default_simulation_count = 2000
            seed = 3
            "#,
        )
        .unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.returns_file.as_deref(), Some("data/returns.csv"));
        assert_eq!(config.risk.default_simulation_count, 2000);
        assert_eq!(config.risk.seed, Some(3));
    }

    #[test]
    fn test_invalid_risk_table_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        std::fs::write(&path, "[risk]\ndefault_confidence_level = 1.5\n").unwrap();
        assert!(ServerConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_overrides_apply_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");

        let config = ServerConfig::load_with(&missing, |key| {
            (key == vantage_config::ENV_SIMULATION_COUNT).then(|| OsString::from("2000"))
        })
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.risk.default_simulation_count, 2000);
    }

    #[test]
    fn test_invalid_override_rejected_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");

        let result = ServerConfig::load_with(&missing, |key| {
            (key == vantage_config::ENV_CONFIDENCE_LEVEL).then(|| OsString::from("1.5"))
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_load_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        std::fs::write(&path, "port = 9100\n").unwrap();

        let config = ServerConfig::load_with(&path, |_| None).unwrap();
        assert_eq!(config.port, 9100);
    }
}
