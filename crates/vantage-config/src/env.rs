//! Environment variable overrides.

use std::ffi::OsString;
use std::str::FromStr;

use crate::error::{ConfigError, ConfigResult};
use crate::risk::RiskConfig;

/// Overrides `default_simulation_count`.
pub const ENV_SIMULATION_COUNT: &str = "VANTAGE_SIMULATION_COUNT";
/// Overrides `default_lookback_periods`.
pub const ENV_LOOKBACK_PERIODS: &str = "VANTAGE_LOOKBACK_PERIODS";
/// Overrides `default_confidence_level`.
pub const ENV_CONFIDENCE_LEVEL: &str = "VANTAGE_CONFIDENCE_LEVEL";
/// Overrides `default_horizon_days`.
pub const ENV_HORIZON_DAYS: &str = "VANTAGE_HORIZON_DAYS";
/// Overrides `fallback_volatility`.
pub const ENV_FALLBACK_VOLATILITY: &str = "VANTAGE_FALLBACK_VOLATILITY";
/// Overrides `seed`.
pub const ENV_SEED: &str = "VANTAGE_SEED";

const ENV_KEYS: [&str; 6] = [
    ENV_SIMULATION_COUNT,
    ENV_LOOKBACK_PERIODS,
    ENV_CONFIDENCE_LEVEL,
    ENV_HORIZON_DAYS,
    ENV_FALLBACK_VOLATILITY,
    ENV_SEED,
];

impl RiskConfig {
    /// Applies `VANTAGE_*` overrides from the process environment.
    ///
    /// Only the `VANTAGE_*` keys are read; other variables are never
    /// inspected.
    pub fn apply_env(&mut self) -> ConfigResult<()> {
        self.apply_lookup(|key| std::env::var_os(key))
    }

    /// Applies `VANTAGE_*` overrides fetched through `lookup`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidEnvironment`] for a value that is not UTF-8 or
    /// does not parse.
    pub fn apply_lookup<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let mut vars = Vec::new();
        for key in ENV_KEYS {
            let Some(raw) = lookup(key) else { continue };
            let value = raw
                .into_string()
                .map_err(|raw| ConfigError::InvalidEnvironment {
                    var: key.to_string(),
                    value: raw.to_string_lossy().into_owned(),
                    message: "value is not valid UTF-8".to_string(),
                })?;
            vars.push((key, value));
        }
        self.apply_overrides(vars)
    }

    /// Applies `VANTAGE_*` overrides from key/value pairs. Unrelated keys
    /// are ignored.
    pub fn apply_overrides<I, K, V>(&mut self, vars: I) -> ConfigResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            match key {
                ENV_SIMULATION_COUNT => self.default_simulation_count = parse(key, value)?,
                ENV_LOOKBACK_PERIODS => self.default_lookback_periods = parse(key, value)?,
                ENV_CONFIDENCE_LEVEL => self.default_confidence_level = parse(key, value)?,
                ENV_HORIZON_DAYS => self.default_horizon_days = parse(key, value)?,
                ENV_FALLBACK_VOLATILITY => self.fallback_volatility = parse(key, value)?,
                ENV_SEED => self.seed = Some(parse(key, value)?),
                _ => {}
            }
        }
        Ok(())
    }
}

fn parse<T>(var: &str, value: &str) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidEnvironment {
        var: var.to_string(),
        value: value.to_string(),
        message: e.to_string(),
    })
}
