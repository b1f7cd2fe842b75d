//! # Vantage Traits
//!
//! Trait definitions for the Vantage risk engine.
//!
//! This crate contains ONLY trait definitions. Implementations live in
//! extension crates (`vantage-ext-file`) or in the engine itself (the
//! read-through cache in `vantage-risk`).
//!
//! ## Module Structure
//!
//! - [`market_data`]: Historical return sources
//! - [`error`]: Error type shared by all sources
//!
//! ## Dependency Injection
//!
//! The risk calculator receives its data source at construction:
//!
//! ```ignore
//! let calculator = RiskCalculator::new(Arc::new(CsvReturnSource::from_file("returns.csv")?), config);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod market_data;

// Re-export commonly used types
pub use error::TraitError;
pub use market_data::{HistoricalDataProvider, SourceType};
