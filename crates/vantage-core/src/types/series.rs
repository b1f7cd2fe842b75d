//! Historical return series.

use std::sync::Arc;

use super::Symbol;

/// Time-ordered periodic returns for one symbol, oldest first.
///
/// The values sit behind an `Arc` so providers, caches and the engine
/// share one immutable buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    symbol: Symbol,
    values: Arc<[f64]>,
}

impl ReturnSeries {
    /// Minimum number of observations for an asset to enter the covariance model.
    pub const MIN_OBSERVATIONS: usize = 2;

    /// Creates a series from returns ordered oldest first.
    pub fn new(symbol: impl Into<Symbol>, values: Vec<f64>) -> Self {
        Self {
            symbol: symbol.into(),
            values: values.into(),
        }
    }

    /// Creates an empty series (unknown symbol or no history).
    pub fn empty(symbol: impl Into<Symbol>) -> Self {
        Self::new(symbol, Vec::new())
    }

    /// Symbol the series belongs to.
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Return values, oldest first.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns true if every value is finite.
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    /// Returns true if the series can enter the covariance model.
    pub fn is_sufficient(&self) -> bool {
        self.len() >= Self::MIN_OBSERVATIONS && self.is_finite()
    }

    /// The most recent `n` observations (all of them if shorter).
    pub fn tail(&self, n: usize) -> &[f64] {
        let start = self.values.len().saturating_sub(n);
        &self.values[start..]
    }

    /// A series restricted to the most recent `lookback` observations.
    ///
    /// Shares the buffer when no truncation is needed.
    #[must_use]
    pub fn truncated(&self, lookback: usize) -> Self {
        if self.values.len() <= lookback {
            return self.clone();
        }
        Self::new(self.symbol.clone(), self.tail(lookback).to_vec())
    }
}
