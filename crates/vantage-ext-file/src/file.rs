//! File-backed history sources.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;
use vantage_core::types::{ReturnSeries, Symbol};
use vantage_math::statistics::log_returns;
use vantage_traits::{HistoricalDataProvider, SourceType, TraitError};

use crate::memory::InMemoryReturnSource;
use crate::SeriesKind;

// =============================================================================
// CSV RETURN SOURCE
// =============================================================================

/// CSV history record.
///
/// Expected format:
/// ```csv
/// symbol,date,value
/// AAPL,2024-01-02,0.0123
/// AAPL,2024-01-03,-0.0041
/// ```
///
/// The `date` column is optional. When every row of a symbol carries a date
/// the rows are ordered by it, otherwise file order is kept.
#[derive(Debug, Deserialize)]
struct HistoryRecord {
    symbol: String,
    #[serde(default)]
    date: Option<NaiveDate>,
    value: f64,
}

/// CSV-based history source.
///
/// Values are read as returns or as prices depending on `kind`. A missing
/// file yields an empty source.
#[derive(Debug)]
pub struct CsvReturnSource {
    file_path: PathBuf,
    kind: SeriesKind,
    store: InMemoryReturnSource,
}

impl CsvReturnSource {
    /// Creates a new CSV history source and loads it.
    pub fn new(file_path: impl AsRef<Path>, kind: SeriesKind) -> Result<Self, TraitError> {
        let source = Self {
            file_path: file_path.as_ref().to_path_buf(),
            kind,
            store: InMemoryReturnSource::new(),
        };
        source.reload()?;
        Ok(source)
    }

    /// Reloads data from file.
    pub fn reload(&self) -> Result<(), TraitError> {
        if !self.file_path.exists() {
            self.store.clear();
            return Ok(());
        }

        let mut reader = csv::Reader::from_path(&self.file_path)
            .map_err(|e| TraitError::IoError(e.to_string()))?;

        let mut rows: HashMap<String, Vec<(Option<NaiveDate>, f64)>> = HashMap::new();
        for result in reader.deserialize() {
            let record: HistoryRecord =
                result.map_err(|e| TraitError::ParseError(e.to_string()))?;
            rows.entry(record.symbol)
                .or_default()
                .push((record.date, record.value));
        }

        let mut parsed = Vec::with_capacity(rows.len());
        for (symbol, mut observations) in rows {
            if observations.iter().all(|(date, _)| date.is_some()) {
                observations.sort_by_key(|(date, _)| *date);
            }
            let values = observations.into_iter().map(|(_, v)| v).collect();
            parsed.push((symbol, values));
        }

        load_into(&self.store, parsed, self.kind)?;
        debug!(
            "loaded {} series from {}",
            self.store.len(),
            self.file_path.display()
        );
        Ok(())
    }

    /// Symbols held after the last load.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.store.symbols()
    }
}

#[async_trait]
impl HistoricalDataProvider for CsvReturnSource {
    fn source_type(&self) -> SourceType {
        SourceType::File
    }

    async fn get_returns(
        &self,
        symbol: &Symbol,
        lookback_periods: usize,
    ) -> Result<ReturnSeries, TraitError> {
        self.store.get_returns(symbol, lookback_periods).await
    }
}

// =============================================================================
// JSON RETURN SOURCE
// =============================================================================

/// JSON-based history source.
///
/// Expected format, oldest value first:
/// ```json
/// { "AAPL": [0.0123, -0.0041], "MSFT": [0.0020, 0.0105] }
/// ```
#[derive(Debug)]
pub struct JsonReturnSource {
    file_path: PathBuf,
    kind: SeriesKind,
    store: InMemoryReturnSource,
}

impl JsonReturnSource {
    /// Creates a new JSON history source and loads it.
    pub fn new(file_path: impl AsRef<Path>, kind: SeriesKind) -> Result<Self, TraitError> {
        let source = Self {
            file_path: file_path.as_ref().to_path_buf(),
            kind,
            store: InMemoryReturnSource::new(),
        };
        source.reload()?;
        Ok(source)
    }

    /// Reloads data from file.
    pub fn reload(&self) -> Result<(), TraitError> {
        if !self.file_path.exists() {
            self.store.clear();
            return Ok(());
        }

        let content = std::fs::read_to_string(&self.file_path)?;
        let data: HashMap<String, Vec<f64>> =
            serde_json::from_str(&content).map_err(|e| TraitError::ParseError(e.to_string()))?;

        load_into(&self.store, data, self.kind)?;
        debug!(
            "loaded {} series from {}",
            self.store.len(),
            self.file_path.display()
        );
        Ok(())
    }

    /// Symbols held after the last load.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.store.symbols()
    }
}

#[async_trait]
impl HistoricalDataProvider for JsonReturnSource {
    fn source_type(&self) -> SourceType {
        SourceType::File
    }

    async fn get_returns(
        &self,
        symbol: &Symbol,
        lookback_periods: usize,
    ) -> Result<ReturnSeries, TraitError> {
        self.store.get_returns(symbol, lookback_periods).await
    }
}

fn load_into(
    store: &InMemoryReturnSource,
    series: impl IntoIterator<Item = (String, Vec<f64>)>,
    kind: SeriesKind,
) -> Result<(), TraitError> {
    let mut converted = Vec::new();
    for (symbol, values) in series {
        let returns = match kind {
            SeriesKind::Returns => values,
            SeriesKind::Prices => log_returns(&values)
                .map_err(|e| TraitError::InvalidInput(format!("{symbol}: {e}")))?,
        };
        converted.push((symbol, returns));
    }

    store.replace_all(converted);
    Ok(())
}
