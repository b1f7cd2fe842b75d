//! Vantage Configuration Layer
//!
//! This crate provides the engine-wide defaults for value-at-risk
//! calculations. Every knob here can be overridden per request.
//!
//! # Features
//!
//! - **Risk Configuration**: Simulation count, lookback window, confidence
//!   level, horizon, fallback volatility and sampler settings
//! - **Validation**: The [`Validate`] trait collects every problem at once
//! - **Loading**: TOML files plus `VANTAGE_*` environment overrides
//!
//! # Example
//!
//! ```rust
//! use vantage_config::{RiskConfig, Validate};
//!
//! let config = RiskConfig::from_toml_str(
//!     r#"
//!     name = "DESK"
//!     default_simulation_count = 50000
//!     default_confidence_level = 0.99
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.default_simulation_count, 50_000);
//! assert_eq!(config.default_lookback_periods, 252);
//! assert!(config.is_valid());
//! ```
//!
//! # Standard Configurations
//!
//! - `STANDARD` - 10,000 simulations, 95% one-day VaR over 252 periods
//! - `HIGH_PRECISION` - 100,000 simulations, 99% confidence

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod env;
mod error;
mod risk;

// Re-export core types
pub use env::{
    ENV_CONFIDENCE_LEVEL, ENV_FALLBACK_VOLATILITY, ENV_HORIZON_DAYS, ENV_LOOKBACK_PERIODS,
    ENV_SEED, ENV_SIMULATION_COUNT,
};
pub use error::{ConfigError, ConfigResult, Validate, ValidationError};
pub use risk::RiskConfig;
pub use vantage_math::random::NormalMethod;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{ConfigError, ConfigResult, Validate};
    pub use crate::risk::RiskConfig;
}
