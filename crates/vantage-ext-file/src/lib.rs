//! # Vantage Ext File
//!
//! Historical return sources for the Vantage risk engine.
//!
//! This crate provides default implementations for testing, EOD loads and
//! static data:
//! - In-memory source for tests and embedding
//! - CSV-based return or price history
//! - JSON-based return or price history
//! - An empty source for running on fallback volatility alone
//!
//! Price files are converted to log returns on load.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod file;
mod memory;

pub use file::*;
pub use memory::*;

use std::path::Path;
use std::sync::Arc;

use vantage_traits::{HistoricalDataProvider, TraitError};

/// What the values in a history file represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeriesKind {
    /// Periodic simple returns, used as-is.
    #[default]
    Returns,
    /// Prices, converted to log returns.
    Prices,
}

/// Create a file-based history provider, choosing the format from the
/// file extension (`.json` is JSON, anything else CSV).
pub fn create_file_history(
    path: impl AsRef<Path>,
    kind: SeriesKind,
) -> Result<Arc<dyn HistoricalDataProvider>, TraitError> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        Ok(Arc::new(JsonReturnSource::new(path, kind)?))
    } else {
        Ok(Arc::new(CsvReturnSource::new(path, kind)?))
    }
}
