//! Read-through cache for historical returns.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::trace;
use vantage_core::types::{ReturnSeries, Symbol};
use vantage_traits::{HistoricalDataProvider, SourceType, TraitError};

type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    symbol: Symbol,
    lookback: usize,
    bucket: u64,
}

/// Caches series per (symbol, lookback, time bucket).
///
/// Cached series are immutable snapshots: every hit within a bucket hands
/// out the same shared buffer. Entries from earlier buckets are evicted
/// when a new entry is inserted; newer buckets are never evicted by a
/// request that read the clock late. A zero bucket length disables caching.
pub struct HistoricalCache {
    inner: Arc<dyn HistoricalDataProvider>,
    entries: DashMap<CacheKey, ReturnSeries>,
    bucket_secs: u64,
    clock: Clock,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl HistoricalCache {
    /// Wraps `inner` with buckets of `bucket` length.
    pub fn new(inner: Arc<dyn HistoricalDataProvider>, bucket: Duration) -> Self {
        Self::with_clock(inner, bucket, Arc::new(unix_seconds))
    }

    /// Wraps `inner` using `clock` (seconds) to assign buckets.
    pub fn with_clock(
        inner: Arc<dyn HistoricalDataProvider>,
        bucket: Duration,
        clock: Clock,
    ) -> Self {
        Self {
            inner,
            entries: DashMap::new(),
            bucket_secs: bucket.as_secs(),
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Number of cached series.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cache hits so far.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Cache misses so far.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    fn current_bucket(&self) -> u64 {
        (self.clock)() / self.bucket_secs
    }
}

#[async_trait]
impl HistoricalDataProvider for HistoricalCache {
    fn source_type(&self) -> SourceType {
        SourceType::Cache
    }

    async fn get_returns(
        &self,
        symbol: &Symbol,
        lookback_periods: usize,
    ) -> Result<ReturnSeries, TraitError> {
        if self.bucket_secs == 0 {
            return self.inner.get_returns(symbol, lookback_periods).await;
        }

        let bucket = self.current_bucket();
        let key = CacheKey {
            symbol: symbol.clone(),
            lookback: lookback_periods,
            bucket,
        };

        if let Some(hit) = self.entries.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(%symbol, lookback_periods, "history cache hit");
            return Ok(hit.value().clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let series = self.inner.get_returns(symbol, lookback_periods).await?;

        self.entries.retain(|k, _| k.bucket >= bucket);
        let stored = self.entries.entry(key).or_insert(series).value().clone();
        Ok(stored)
    }
}

impl std::fmt::Debug for HistoricalCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoricalCache")
            .field("entries", &self.entries.len())
            .field("bucket_secs", &self.bucket_secs)
            .finish_non_exhaustive()
    }
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HistoricalDataProvider for Counting {
        fn source_type(&self) -> SourceType {
            SourceType::Memory
        }

        async fn get_returns(
            &self,
            symbol: &Symbol,
            lookback_periods: usize,
        ) -> Result<ReturnSeries, TraitError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ReturnSeries::new(symbol.clone(), vec![0.01; lookback_periods]))
        }
    }

    fn manual_clock() -> (Arc<AtomicU64>, Clock) {
        let now = Arc::new(AtomicU64::new(1_000));
        let handle = now.clone();
        (now, Arc::new(move || handle.load(Ordering::SeqCst)))
    }

    #[tokio::test]
    async fn test_repeated_fetch_served_from_one_snapshot() {
        let inner = Arc::new(Counting::default());
        let cache = HistoricalCache::new(inner.clone(), Duration::from_secs(300));
        let symbol = Symbol::new("AAPL");

        let a = cache.get_returns(&symbol, 10).await.unwrap();
        let b = cache.get_returns(&symbol, 10).await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
        assert!(std::ptr::eq(a.values().as_ptr(), b.values().as_ptr()));
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }

    #[tokio::test]
    async fn test_lookback_is_part_of_key() {
        let inner = Arc::new(Counting::default());
        let cache = HistoricalCache::new(inner.clone(), Duration::from_secs(300));
        let symbol = Symbol::new("AAPL");

        assert_eq!(cache.get_returns(&symbol, 5).await.unwrap().len(), 5);
        assert_eq!(cache.get_returns(&symbol, 8).await.unwrap().len(), 8);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_new_bucket_refetches_and_evicts() {
        let inner = Arc::new(Counting::default());
        let (now, clock) = manual_clock();
        let cache = HistoricalCache::with_clock(inner.clone(), Duration::from_secs(60), clock);
        let symbol = Symbol::new("MSFT");

        cache.get_returns(&symbol, 3).await.unwrap();
        cache.get_returns(&Symbol::new("IBM"), 3).await.unwrap();
        assert_eq!(cache.len(), 2);

        now.fetch_add(60, Ordering::SeqCst);
        cache.get_returns(&symbol, 3).await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_late_request_keeps_newer_bucket() {
        let inner = Arc::new(Counting::default());
        let (now, clock) = manual_clock();
        let cache = HistoricalCache::with_clock(inner.clone(), Duration::from_secs(60), clock);
        let fresh = Symbol::new("MSFT");

        now.store(1_080, Ordering::SeqCst);
        cache.get_returns(&fresh, 3).await.unwrap();

        now.store(1_000, Ordering::SeqCst);
        cache.get_returns(&Symbol::new("IBM"), 3).await.unwrap();
        assert_eq!(cache.len(), 2);

        now.store(1_080, Ordering::SeqCst);
        cache.get_returns(&fresh, 3).await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.hits(), 1);
    }

    #[tokio::test]
    async fn test_zero_bucket_disables_cache() {
        let inner = Arc::new(Counting::default());
        let cache = HistoricalCache::new(inner.clone(), Duration::ZERO);
        let symbol = Symbol::new("AAPL");

        cache.get_returns(&symbol, 2).await.unwrap();
        cache.get_returns(&symbol, 2).await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
        assert_eq!(cache.source_type(), SourceType::Cache);
    }
}
