//! # Vantage Core
//!
//! Core domain types for the Vantage value-at-risk engine.
//!
//! This crate provides the types every other Vantage crate speaks:
//!
//! - **Portfolio**: [`Position`] and [`Portfolio`] snapshots owned by the caller
//! - **History**: [`ReturnSeries`] shared, read-only return views
//! - **Requests**: [`VaRRequest`] and [`RiskModel`]
//! - **Results**: [`VaRResult`] and [`SimulationMode`]
//!
//! ## Example
//!
//! ```rust
//! use vantage_core::prelude::*;
//! use rust_decimal_macros::dec;
//!
//! let portfolio = Portfolio::new("crypto")
//!     .with_position(Position::priced("BTC-USD", dec!(0.5), dec!(60000), dec!(64000)))
//!     .with_position(Position::priced("ETH-USD", dec!(4), dec!(3000), dec!(3100)));
//!
//! assert_eq!(portfolio.exposures().len(), 2);
//! assert!(portfolio.baseline_value() > 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]

pub mod error;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::types::{
        Exposure, Portfolio, Position, ReturnSeries, RiskModel, SimulationMode, Symbol,
        VaRRequest, VaRResult,
    };
}

pub use error::{CoreError, CoreResult};
pub use types::{
    Exposure, Portfolio, Position, ReturnSeries, RiskModel, SimulationMode, Symbol, VaRRequest,
    VaRResult,
};
