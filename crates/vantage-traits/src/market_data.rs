//! Historical market data source traits.
//!
//! A [`HistoricalDataProvider`] supplies per-symbol periodic return series,
//! oldest first. Unknown symbols yield an empty series rather than an
//! error; the engine decides what an empty or short series means.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TraitError;
use vantage_core::types::{ReturnSeries, Symbol};

/// Source type for market data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceType {
    /// File-based (CSV, JSON)
    File,
    /// Held in process memory
    Memory,
    /// Database (for historical/EOD)
    Database,
    /// Decorator over another source
    Cache,
    /// Manual entry
    Manual,
}

/// Trait for historical return providers.
#[async_trait]
pub trait HistoricalDataProvider: Send + Sync {
    /// Source type.
    fn source_type(&self) -> SourceType;

    /// Returns at most `lookback_periods` of the most recent returns for
    /// `symbol`, oldest first.
    ///
    /// An unknown symbol is an empty series, not an error.
    async fn get_returns(
        &self,
        symbol: &Symbol,
        lookback_periods: usize,
    ) -> Result<ReturnSeries, TraitError>;
}
