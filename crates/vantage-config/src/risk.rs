//! Value-at-risk engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use vantage_math::random::NormalMethod;

use crate::error::{ConfigError, ConfigResult, Validate, ValidationError};

/// Engine-wide defaults for value-at-risk calculations.
///
/// Request fields left unset fall back to the `default_*` values here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Configuration name/identifier.
    #[serde(default = "default_name")]
    pub name: String,

    /// Description of this configuration.
    #[serde(default)]
    pub description: Option<String>,

    /// Number of Monte Carlo simulations.
    #[serde(default = "default_simulation_count")]
    pub default_simulation_count: usize,

    /// Number of historical periods fetched per symbol.
    #[serde(default = "default_lookback_periods")]
    pub default_lookback_periods: usize,

    /// VaR confidence level, strictly between 0 and 1.
    #[serde(default = "default_confidence_level")]
    pub default_confidence_level: f64,

    /// Horizon in days.
    #[serde(default = "default_horizon_days")]
    pub default_horizon_days: u32,

    /// Per-period volatility used when no asset has usable history, and for
    /// exposure in assets left out of the covariance model.
    #[serde(default = "default_fallback_volatility")]
    pub fallback_volatility: f64,

    /// Upper bound on the simulation count a request may ask for.
    #[serde(default = "default_max_simulation_count")]
    pub max_simulation_count: usize,

    /// Budget for fetching history. Symbols not answered in time are
    /// treated as having no history. Zero means no limit.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Standard-normal sampler.
    #[serde(default)]
    pub normal_method: NormalMethod,

    /// Run simulation chunks on the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Simulations per random stream.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Lifetime of cached history, in seconds. Zero disables caching.
    #[serde(default = "default_cache_bucket_secs")]
    pub cache_bucket_secs: u64,

    /// Random seed for reproducibility (None = fresh entropy per request).
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_name() -> String {
    "CUSTOM".to_string()
}

fn default_simulation_count() -> usize {
    10_000
}

fn default_lookback_periods() -> usize {
    252
}

fn default_confidence_level() -> f64 {
    0.95
}

fn default_horizon_days() -> u32 {
    1
}

fn default_fallback_volatility() -> f64 {
    0.02
}

fn default_max_simulation_count() -> usize {
    10_000_000
}

fn default_fetch_timeout_ms() -> u64 {
    5_000
}

fn default_parallel() -> bool {
    true
}

fn default_chunk_size() -> usize {
    1024
}

fn default_cache_bucket_secs() -> u64 {
    300
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl RiskConfig {
    /// Creates a risk configuration with default values.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            default_simulation_count: default_simulation_count(),
            default_lookback_periods: default_lookback_periods(),
            default_confidence_level: default_confidence_level(),
            default_horizon_days: default_horizon_days(),
            fallback_volatility: default_fallback_volatility(),
            max_simulation_count: default_max_simulation_count(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            normal_method: NormalMethod::default(),
            parallel: default_parallel(),
            chunk_size: default_chunk_size(),
            cache_bucket_secs: default_cache_bucket_secs(),
            seed: None,
        }
    }

    /// Creates standard risk configuration.
    pub fn standard() -> Self {
        Self {
            description: Some("Standard value-at-risk configuration".to_string()),
            ..Self::new("STANDARD")
        }
    }

    /// Creates high-precision risk configuration.
    pub fn high_precision() -> Self {
        Self {
            description: Some("High-precision value-at-risk configuration".to_string()),
            default_simulation_count: 100_000,
            default_confidence_level: 0.99,
            default_lookback_periods: 504,
            ..Self::new("HIGH_PRECISION")
        }
    }

    /// Parses a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(s: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Loads a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Serializes to TOML.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Builder method to set the simulation count.
    #[must_use]
    pub fn with_simulation_count(mut self, count: usize) -> Self {
        self.default_simulation_count = count;
        self
    }

    /// Builder method to set the lookback window.
    #[must_use]
    pub fn with_lookback_periods(mut self, periods: usize) -> Self {
        self.default_lookback_periods = periods;
        self
    }

    /// Builder method to set the confidence level.
    #[must_use]
    pub fn with_confidence_level(mut self, level: f64) -> Self {
        self.default_confidence_level = level;
        self
    }

    /// Builder method to set the horizon.
    #[must_use]
    pub fn with_horizon_days(mut self, days: u32) -> Self {
        self.default_horizon_days = days;
        self
    }

    /// Builder method to set the fallback volatility.
    #[must_use]
    pub fn with_fallback_volatility(mut self, volatility: f64) -> Self {
        self.fallback_volatility = volatility;
        self
    }

    /// Builder method to fix the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method to select the normal sampler.
    #[must_use]
    pub fn with_normal_method(mut self, method: NormalMethod) -> Self {
        self.normal_method = method;
        self
    }

    /// Builder method to toggle parallel simulation.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Builder method to set the chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Builder method to set the fetch timeout.
    #[must_use]
    pub fn with_fetch_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.fetch_timeout_ms = timeout_ms;
        self
    }

    /// Builder method to set the cache bucket length.
    #[must_use]
    pub fn with_cache_bucket_secs(mut self, secs: u64) -> Self {
        self.cache_bucket_secs = secs;
        self
    }
}

impl Validate for RiskConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.name.is_empty() {
            errors.push(ValidationError::new("name", "Name cannot be empty"));
        }

        if self.default_simulation_count == 0
            || self.default_simulation_count > self.max_simulation_count
        {
            errors.push(ValidationError::with_rule(
                "default_simulation_count",
                format!(
                    "Simulation count must be between 1 and {}",
                    self.max_simulation_count
                ),
                "valid_simulation_count",
            ));
        }

        if self.default_lookback_periods < 2 {
            errors.push(ValidationError::with_rule(
                "default_lookback_periods",
                "Lookback must cover at least 2 periods",
                "valid_lookback",
            ));
        }

        if !(self.default_confidence_level > 0.0 && self.default_confidence_level < 1.0) {
            errors.push(ValidationError::with_rule(
                "default_confidence_level",
                "Confidence level must be strictly between 0 and 1",
                "valid_confidence",
            ));
        }

        if self.default_horizon_days == 0 {
            errors.push(ValidationError::with_rule(
                "default_horizon_days",
                "Horizon must be at least 1 day",
                "positive_horizon",
            ));
        }

        if !(self.fallback_volatility > 0.0 && self.fallback_volatility <= 1.0) {
            errors.push(ValidationError::with_rule(
                "fallback_volatility",
                "Fallback volatility must be in (0, 1]",
                "valid_volatility",
            ));
        }

        if self.chunk_size == 0 {
            errors.push(ValidationError::with_rule(
                "chunk_size",
                "Chunk size must be positive",
                "positive_chunk",
            ));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_defaults() {
        let config = RiskConfig::standard();
        assert_eq!(config.name, "STANDARD");
        assert_eq!(config.default_simulation_count, 10_000);
        assert_eq!(config.default_lookback_periods, 252);
        assert_eq!(config.default_confidence_level, 0.95);
        assert_eq!(config.default_horizon_days, 1);
        assert_eq!(config.fallback_volatility, 0.02);
        assert_eq!(config.normal_method, NormalMethod::Ziggurat);
        assert!(config.seed.is_none());
        assert!(config.is_valid());
    }

    #[test]
    fn test_high_precision() {
        let config = RiskConfig::high_precision();
        assert_eq!(config.name, "HIGH_PRECISION");
        assert_eq!(config.default_simulation_count, 100_000);
        assert!(config.is_valid());
    }

    #[test]
    fn test_validation() {
        let mut config = RiskConfig::new("test");
        assert!(config.is_valid());

        config.default_confidence_level = 1.0;
        config.default_simulation_count = 0;
        let errors = config.validate();
        assert_eq!(errors.len(), 2);
        assert!(config.validate_or_error().is_err());

        let config = RiskConfig::new("test").with_confidence_level(f64::NAN);
        assert!(!config.is_valid());

        let config = RiskConfig::new("test").with_horizon_days(0);
        assert_eq!(config.validate()[0].field, "default_horizon_days");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = RiskConfig::from_toml_str(
            r#"
            default_horizon_days = 10
            normal_method = "box_muller"
            seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.name, "CUSTOM");
        assert_eq!(config.default_horizon_days, 10);
        assert_eq!(config.normal_method, NormalMethod::BoxMuller);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.chunk_size, 1024);
    }

    #[test]
    fn test_toml_round_trip_through_file() {
        let config = RiskConfig::high_precision().with_seed(11);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("risk.toml");
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        let loaded = RiskConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let err = RiskConfig::from_file("/nonexistent/risk.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_bad_toml() {
        let err = RiskConfig::from_toml_str("default_simulation_count = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Deserialization(_)));
    }
}
