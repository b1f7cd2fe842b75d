//! Domain types for value-at-risk calculations.
//!
//! - [`Symbol`]: Asset identifier
//! - [`Position`] / [`Portfolio`]: Read-only valuation snapshot
//! - [`Exposure`]: Per-symbol aggregated market value
//! - [`ReturnSeries`]: Time-ordered periodic returns
//! - [`VaRRequest`] / [`RiskModel`]: Calculation input
//! - [`VaRResult`] / [`SimulationMode`]: Calculation output

mod portfolio;
mod request;
mod result;
mod series;
mod symbol;

pub use portfolio::{Exposure, Portfolio, Position};
pub use request::{RiskModel, VaRRequest};
pub use result::{SimulationMode, VaRResult};
pub use series::ReturnSeries;
pub use symbol::Symbol;
