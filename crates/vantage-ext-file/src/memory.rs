//! In-memory history sources.

use std::collections::HashSet;

use async_trait::async_trait;
use dashmap::DashMap;
use vantage_core::types::{ReturnSeries, Symbol};
use vantage_math::statistics::log_returns;
use vantage_traits::{HistoricalDataProvider, SourceType, TraitError};

// =============================================================================
// IN-MEMORY RETURN SOURCE
// =============================================================================

/// Holds full return histories in memory and serves the most recent
/// `lookback` values on request.
///
/// Useful for tests, for embedding the engine, and as the backing store of
/// the file sources once they have been parsed.
#[derive(Debug, Default)]
pub struct InMemoryReturnSource {
    series: DashMap<Symbol, ReturnSeries>,
}

impl InMemoryReturnSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method adding a return history.
    #[must_use]
    pub fn with_returns(self, symbol: impl Into<Symbol>, returns: Vec<f64>) -> Self {
        self.insert(symbol, returns);
        self
    }

    /// Builder method adding a price history, converted to log returns.
    pub fn with_prices(
        self,
        symbol: impl Into<Symbol>,
        prices: &[f64],
    ) -> Result<Self, TraitError> {
        self.insert_prices(symbol, prices)?;
        Ok(self)
    }

    /// Stores (or replaces) the return history for `symbol`.
    pub fn insert(&self, symbol: impl Into<Symbol>, returns: Vec<f64>) {
        let symbol = symbol.into();
        let series = ReturnSeries::new(symbol.clone(), returns);
        self.series.insert(symbol, series);
    }

    /// Stores the log returns of a price history for `symbol`.
    pub fn insert_prices(&self, symbol: impl Into<Symbol>, prices: &[f64]) -> Result<(), TraitError> {
        let symbol = symbol.into();
        let returns = log_returns(prices)
            .map_err(|e| TraitError::InvalidInput(format!("{symbol}: {e}")))?;
        self.insert(symbol, returns);
        Ok(())
    }

    /// Replaces the whole store with `series`.
    ///
    /// New histories are written before stale symbols are dropped, so a
    /// symbol present in both the old and new set is always readable.
    pub fn replace_all<S>(&self, series: impl IntoIterator<Item = (S, Vec<f64>)>)
    where
        S: Into<Symbol>,
    {
        let mut keep = HashSet::new();
        for (symbol, returns) in series {
            let symbol = symbol.into();
            keep.insert(symbol.clone());
            self.insert(symbol, returns);
        }
        self.series.retain(|symbol, _| keep.contains(symbol));
    }

    /// Removes a symbol's history.
    pub fn remove(&self, symbol: &Symbol) -> Option<ReturnSeries> {
        self.series.remove(symbol).map(|(_, s)| s)
    }

    /// Drops every history.
    pub fn clear(&self) {
        self.series.clear();
    }

    /// Number of symbols held.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Returns true if no history is held.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Symbols with a stored history, sorted.
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = self.series.iter().map(|e| e.key().clone()).collect();
        symbols.sort();
        symbols
    }

    fn lookup(&self, symbol: &Symbol, lookback_periods: usize) -> ReturnSeries {
        self.series
            .get(symbol)
            .map(|s| s.truncated(lookback_periods))
            .unwrap_or_else(|| ReturnSeries::empty(symbol.clone()))
    }
}

#[async_trait]
impl HistoricalDataProvider for InMemoryReturnSource {
    fn source_type(&self) -> SourceType {
        SourceType::Memory
    }

    async fn get_returns(
        &self,
        symbol: &Symbol,
        lookback_periods: usize,
    ) -> Result<ReturnSeries, TraitError> {
        Ok(self.lookup(symbol, lookback_periods))
    }
}

// =============================================================================
// EMPTY SOURCE
// =============================================================================

/// Empty history source that knows no symbols.
///
/// Every request is answered with an empty series, so calculations run on
/// the fallback volatility.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyReturnSource;

#[async_trait]
impl HistoricalDataProvider for EmptyReturnSource {
    fn source_type(&self) -> SourceType {
        SourceType::Manual
    }

    async fn get_returns(
        &self,
        symbol: &Symbol,
        _lookback_periods: usize,
    ) -> Result<ReturnSeries, TraitError> {
        Ok(ReturnSeries::empty(symbol.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_most_recent_lookback() {
        let source = InMemoryReturnSource::new().with_returns("AAPL", vec![0.1, 0.2, 0.3, 0.4]);

        let series = source.get_returns(&Symbol::new("AAPL"), 2).await.unwrap();
        assert_eq!(series.values(), &[0.3, 0.4]);

        let all = source.get_returns(&Symbol::new("AAPL"), 100).await.unwrap();
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_empty() {
        let source = InMemoryReturnSource::new();
        let series = source.get_returns(&Symbol::new("NONE"), 10).await.unwrap();
        assert!(series.is_empty());
        assert_eq!(series.symbol().as_str(), "NONE");
    }

    #[tokio::test]
    async fn test_prices_become_log_returns() {
        let source = InMemoryReturnSource::new()
            .with_prices("X", &[100.0, 110.0, 99.0])
            .unwrap();
        let series = source.get_returns(&Symbol::new("X"), 10).await.unwrap();
        assert_eq!(series.len(), 2);
        assert!((series.values()[0] - (1.1f64).ln()).abs() < 1e-12);
        assert!((series.values()[1] - (0.9f64).ln()).abs() < 1e-12);
    }

    #[test]
    fn test_bad_prices_rejected() {
        let source = InMemoryReturnSource::new();
        let err = source.insert_prices("X", &[100.0, 0.0]).unwrap_err();
        assert!(matches!(err, TraitError::InvalidInput(_)));
        assert!(source.is_empty());
    }

    #[test]
    fn test_insert_replace_remove() {
        let source = InMemoryReturnSource::new()
            .with_returns("B", vec![0.1])
            .with_returns("A", vec![0.2]);
        assert_eq!(source.symbols(), vec![Symbol::new("A"), Symbol::new("B")]);

        source.insert("A", vec![0.5, 0.6]);
        assert_eq!(source.len(), 2);
        assert!(source.remove(&Symbol::new("B")).is_some());
        source.clear();
        assert!(source.is_empty());
    }

    #[test]
    fn test_replace_all_drops_stale_symbols() {
        let source = InMemoryReturnSource::new()
            .with_returns("A", vec![0.1])
            .with_returns("B", vec![0.2]);

        source.replace_all([("A", vec![0.3, 0.4]), ("C", vec![0.5])]);

        assert_eq!(source.symbols(), vec![Symbol::new("A"), Symbol::new("C")]);
        assert_eq!(source.lookup(&Symbol::new("A"), 10).values(), &[0.3, 0.4]);
    }

    #[test]
    fn test_replace_all_keeps_shared_symbols_readable() {
        let source = InMemoryReturnSource::new().with_returns("A", vec![0.1]);
        let symbol = Symbol::new("A");

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for i in 0..2_000 {
                    source.replace_all([("A", vec![i as f64]), ("B", vec![0.0])]);
                }
            });
            for _ in 0..2_000 {
                assert_eq!(source.lookup(&symbol, 1).len(), 1);
            }
        });
    }

    #[tokio::test]
    async fn test_empty_source() {
        let source = EmptyReturnSource;
        let series = source.get_returns(&Symbol::new("AAPL"), 10).await.unwrap();
        assert!(series.is_empty());
        assert_eq!(source.source_type(), SourceType::Manual);
    }
}
