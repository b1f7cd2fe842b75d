//! # vantage-risk
//!
//! Monte Carlo and historical value-at-risk for multi-asset portfolios.
//!
//! The engine is a pipeline of four stages, each of which degrades rather
//! than fails:
//!
//! - **History**: per-symbol returns fetched concurrently from a
//!   [`HistoricalDataProvider`](vantage_traits::HistoricalDataProvider)
//! - **Statistics**: mean vector and sample covariance over the assets with
//!   usable history ([`StatisticsEngine`])
//! - **Scenarios**: correlated shocks through a Cholesky factor, independent
//!   shocks when the covariance does not factor, or a single
//!   portfolio-level shock when no asset has history ([`ScenarioGenerator`])
//! - **Aggregation**: empirical quantile and expected shortfall
//!   ([`VaRAggregator`])
//!
//! ## Example
//!
//! ```ignore
//! use vantage_risk::prelude::*;
//!
//! let calculator = RiskCalculator::with_cache(provider, RiskConfig::standard());
//! let request = VaRRequest::new(portfolio)
//!     .with_confidence_level(0.99)
//!     .with_horizon_days(10)
//!     .with_seed(42);
//!
//! let result = calculator.calculate(&request).await?;
//! assert!(result.value_at_risk >= 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregator;
pub mod cache;
pub mod calculator;
mod error;
pub mod historical;
pub mod params;
pub mod scenario;
pub mod statistics;

pub use aggregator::{TailSummary, VaRAggregator};
pub use cache::HistoricalCache;
pub use calculator::RiskCalculator;
pub use error::{RiskError, RiskResult};
pub use historical::HistoricalSimulator;
pub use params::VaRParameters;
pub use scenario::{ScenarioGenerator, ScenarioInputs, SimulationPlan};
pub use statistics::{CovarianceModel, Estimate, Statistics, StatisticsEngine};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::calculator::RiskCalculator;
    pub use crate::statistics::{CovarianceModel, Estimate};
    pub use crate::{RiskError, RiskResult};
    pub use vantage_config::RiskConfig;
    pub use vantage_core::types::{Portfolio, Position, RiskModel, SimulationMode, VaRRequest, VaRResult};
}
