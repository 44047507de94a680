//! In-memory store implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use covid_core::{CaseStore, CountryCode, CountryEntry, Result};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Simple in-memory store for testing and development.
///
/// Rows are stored in an `RwLock`-protected `HashMap` keyed by
/// `(timestamp, country_code)`, so re-adding a row for the same country and
/// date replaces the earlier one. Data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    rows: RwLock<HashMap<(NaiveDate, CountryCode), CountryEntry>>,
}

impl InMemoryStore {
    /// Create a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given rows.
    #[must_use]
    pub fn with_rows(rows: impl IntoIterator<Item = CountryEntry>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| ((row.timestamp, row.country_code.clone()), row))
            .collect();
        Self {
            rows: RwLock::new(rows),
        }
    }
}

#[async_trait]
impl CaseStore for InMemoryStore {
    #[instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<CountryEntry>> {
        let rows = self.rows.read().await;
        let mut all: Vec<CountryEntry> = rows.values().cloned().collect();
        all.sort_by(|a, b| {
            (a.timestamp, a.country_code.as_str()).cmp(&(b.timestamp, b.country_code.as_str()))
        });
        debug!("Fetched {} rows", all.len());
        Ok(all)
    }

    #[instrument(skip(self, entries), fields(count = entries.len()))]
    async fn add(&self, entries: &[CountryEntry]) -> Result<()> {
        let mut rows = self.rows.write().await;
        for entry in entries {
            rows.insert(
                (entry.timestamp, entry.country_code.clone()),
                entry.clone(),
            );
        }
        debug!("Stored {} rows", entries.len());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn latest(&self) -> Result<Option<NaiveDate>> {
        let rows = self.rows.read().await;
        Ok(rows.keys().map(|(timestamp, _)| *timestamp).max())
    }
}
