//! The memoizing series cache.

use chrono::{DateTime, NaiveDate, Utc};
use covid_core::{AggregatedEntry, CaseStore, Result, aggregate};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// Memoized totals/deltas pair with its expiry.
#[derive(Debug, Default)]
struct CacheState {
    totals: Arc<Vec<AggregatedEntry>>,
    deltas: Arc<Vec<AggregatedEntry>>,
    expiry: Option<DateTime<Utc>>,
}

impl CacheState {
    /// True when nothing has been computed yet or the retention window has
    /// passed. `expiry` is `None` only before the first successful refresh.
    fn is_stale(&self) -> bool {
        match self.expiry {
            Some(expiry) => Utc::now() >= expiry,
            None => true,
        }
    }
}

/// Memoizing cache over a [`CaseStore`].
///
/// Reads lazily recompute the aggregated global series from a fresh store
/// fetch when the cached copy is missing or older than the retention window,
/// then answer range-bounded queries against the memoized series.
///
/// Concurrency: one async mutex guards the cached state and is held across
/// the whole check-fetch-aggregate-replace sequence, so concurrent readers
/// that arrive while a refresh is in flight block on that refresh instead of
/// triggering their own (at most one recomputation per staleness window).
/// Staleness is re-checked after the lock is acquired; a reader that waited
/// out someone else's refresh skips the redundant fetch. Series are handed
/// out as `Arc` snapshots, so a reader never observes a half-written series.
///
/// Failure: a failed store fetch leaves the previous state untouched and
/// does not advance the expiry, so the next read retries immediately. If
/// data exists it is served stale with a warning; on a cold cache the error
/// propagates to the caller.
pub struct SeriesCache {
    store: Arc<dyn CaseStore>,
    retention: Duration,
    state: Mutex<CacheState>,
}

impl std::fmt::Debug for SeriesCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeriesCache")
            .field("retention", &self.retention)
            .finish_non_exhaustive()
    }
}

impl SeriesCache {
    /// Creates a new, empty cache over the given store.
    ///
    /// `retention` is how long a computed aggregation is considered fresh
    /// before the next read triggers recomputation.
    #[must_use]
    pub fn new(store: Arc<dyn CaseStore>, retention: Duration) -> Self {
        Self {
            store,
            retention,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Returns the global cumulative series up to and including `end`.
    #[instrument(skip(self))]
    pub async fn totals(&self, end: NaiveDate) -> Result<Vec<AggregatedEntry>> {
        let (totals, _) = self.refreshed().await?;
        Ok(up_to(&totals, end))
    }

    /// Returns the global incremental series up to and including `end`.
    #[instrument(skip(self))]
    pub async fn deltas(&self, end: NaiveDate) -> Result<Vec<AggregatedEntry>> {
        let (_, deltas) = self.refreshed().await?;
        Ok(up_to(&deltas, end))
    }

    /// Ensures the memoized series is fresh and returns a snapshot of it.
    async fn refreshed(
        &self,
    ) -> Result<(Arc<Vec<AggregatedEntry>>, Arc<Vec<AggregatedEntry>>)> {
        let mut state = self.state.lock().await;

        // Re-check under the lock: another reader may have refreshed while
        // this one waited.
        if state.is_stale() {
            match self.store.fetch_all().await {
                Ok(rows) => {
                    let totals = aggregate::accumulate(&rows);
                    let deltas = aggregate::delta(&totals);
                    debug!(rows = rows.len(), points = totals.len(), "Refreshed series");
                    state.totals = Arc::new(totals);
                    state.deltas = Arc::new(deltas);
                    state.expiry = Some(
                        Utc::now()
                            + chrono::TimeDelta::from_std(self.retention)
                                .unwrap_or(chrono::TimeDelta::MAX),
                    );
                }
                // Expiry stays put: the next read retries immediately.
                Err(e) if state.expiry.is_none() => return Err(e),
                Err(e) => {
                    warn!(error = %e, "Store fetch failed, serving stale series");
                }
            }
        }

        Ok((Arc::clone(&state.totals), Arc::clone(&state.deltas)))
    }
}

/// Returns the prefix of a time-sorted series with `timestamp <= end`.
///
/// Entries exactly at `end` are included.
fn up_to(series: &[AggregatedEntry], end: NaiveDate) -> Vec<AggregatedEntry> {
    let mut out = Vec::new();
    for entry in series {
        if entry.timestamp > end {
            break;
        }
        out.push(*entry);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use covid_core::{CountryEntry, CovidError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store stub that counts fetches and can be told to start failing
    /// after a number of successful calls.
    struct MockStore {
        rows: Vec<CountryEntry>,
        calls: AtomicUsize,
        fail_from: Option<usize>,
    }

    impl MockStore {
        fn serving(rows: Vec<CountryEntry>) -> Self {
            Self {
                rows,
                calls: AtomicUsize::new(0),
                fail_from: None,
            }
        }

        fn failing_from(rows: Vec<CountryEntry>, call: usize) -> Self {
            Self {
                rows,
                calls: AtomicUsize::new(0),
                fail_from: Some(call),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CaseStore for MockStore {
        async fn fetch_all(&self) -> Result<Vec<CountryEntry>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_from {
                Some(from) if call >= from => {
                    Err(CovidError::Store("connection refused".to_string()))
                }
                _ => Ok(self.rows.clone()),
            }
        }

        async fn add(&self, _entries: &[CountryEntry]) -> Result<()> {
            Ok(())
        }

        async fn latest(&self) -> Result<Option<NaiveDate>> {
            Ok(self.rows.iter().map(|r| r.timestamp).max())
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, day).unwrap()
    }

    fn sample_rows() -> Vec<CountryEntry> {
        vec![
            CountryEntry::new(date(1), "BE", "Belgium", 1, 0, 0),
            CountryEntry::new(date(2), "US", "United States", 3, 0, 0),
            CountryEntry::new(date(2), "BE", "Belgium", 3, 1, 0),
            CountryEntry::new(date(4), "US", "United States", 10, 5, 1),
        ]
    }

    const DAY: Duration = Duration::from_secs(86_400);

    #[tokio::test]
    async fn totals_and_deltas_serve_aggregated_series() {
        let store = Arc::new(MockStore::serving(sample_rows()));
        let cache = SeriesCache::new(store, DAY);

        let totals = cache.totals(date(31)).await.unwrap();
        assert_eq!(
            totals,
            vec![
                AggregatedEntry::new(date(1), 1, 0, 0),
                AggregatedEntry::new(date(2), 6, 1, 0),
                AggregatedEntry::new(date(4), 13, 6, 1),
            ]
        );

        let deltas = cache.deltas(date(31)).await.unwrap();
        assert_eq!(
            deltas,
            vec![
                AggregatedEntry::new(date(1), 1, 0, 0),
                AggregatedEntry::new(date(2), 5, 1, 0),
                AggregatedEntry::new(date(4), 7, 5, 1),
            ]
        );
    }

    #[tokio::test]
    async fn end_filter_includes_exact_timestamp() {
        let store = Arc::new(MockStore::serving(sample_rows()));
        let cache = SeriesCache::new(store, DAY);

        // end exactly on a cached entry includes it.
        let totals = cache.totals(date(2)).await.unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals.last().unwrap().timestamp, date(2));

        // One day earlier excludes it.
        let totals = cache.totals(date(1)).await.unwrap();
        assert_eq!(totals.len(), 1);

        // Before the first entry: empty, not an error.
        let totals = cache.totals(date(1).pred_opt().unwrap()).await.unwrap();
        assert!(totals.is_empty());
    }

    #[tokio::test]
    async fn fresh_cache_fetches_once() {
        let store = Arc::new(MockStore::serving(sample_rows()));
        let cache = SeriesCache::new(Arc::clone(&store) as Arc<dyn CaseStore>, DAY);

        cache.totals(date(31)).await.unwrap();
        cache.deltas(date(31)).await.unwrap();
        cache.totals(date(2)).await.unwrap();

        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn zero_retention_refetches_every_read() {
        let store = Arc::new(MockStore::serving(sample_rows()));
        let cache = SeriesCache::new(Arc::clone(&store) as Arc<dyn CaseStore>, Duration::ZERO);

        cache.totals(date(31)).await.unwrap();
        cache.totals(date(31)).await.unwrap();

        assert_eq!(store.calls(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_readers_share_one_refresh() {
        let store = Arc::new(MockStore::serving(sample_rows()));
        let cache = Arc::new(SeriesCache::new(
            Arc::clone(&store) as Arc<dyn CaseStore>,
            DAY,
        ));

        let mut handles = Vec::new();
        for i in 0..16 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    cache.totals(date(31)).await
                } else {
                    cache.deltas(date(31)).await
                }
            }));
        }
        for handle in handles {
            let series = handle.await.unwrap().unwrap();
            assert_eq!(series.len(), 3);
        }

        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn cold_cache_propagates_store_error() {
        let store = Arc::new(MockStore::failing_from(sample_rows(), 0));
        let cache = SeriesCache::new(Arc::clone(&store) as Arc<dyn CaseStore>, DAY);

        let err = cache.totals(date(31)).await.unwrap_err();
        assert!(matches!(err, CovidError::Store(_)));

        // The failure did not advance the expiry; the next read retries.
        let _ = cache.totals(date(31)).await.unwrap_err();
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn stale_data_served_when_refresh_fails() {
        let store = Arc::new(MockStore::failing_from(sample_rows(), 1));
        let cache = SeriesCache::new(Arc::clone(&store) as Arc<dyn CaseStore>, Duration::ZERO);

        // First read populates the cache; second read's refresh fails but
        // the previously cached series is returned without error.
        let first = cache.totals(date(31)).await.unwrap();
        let second = cache.totals(date(31)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn empty_store_yields_empty_series() {
        let store = Arc::new(MockStore::serving(Vec::new()));
        let cache = SeriesCache::new(store, DAY);

        assert!(cache.totals(date(31)).await.unwrap().is_empty());
        assert!(cache.deltas(date(31)).await.unwrap().is_empty());
    }
}
