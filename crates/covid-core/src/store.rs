//! Store trait for persisted case snapshot rows.
//!
//! This module defines the [`CaseStore`] trait that the cache and ingestion
//! layers use to read and append snapshot rows.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{error::Result, types::CountryEntry};

/// Trait for storing and retrieving case snapshot rows.
///
/// Implementations can keep rows in various backends (SQLite, in-memory,
/// etc.). Readers fetch everything and aggregate in memory; the store does
/// no server-side filtering or paging. Retry and backoff against a real
/// database or upstream API are the implementation's responsibility, not
/// the caller's.
#[async_trait]
pub trait CaseStore: Send + Sync {
    /// Returns every currently known snapshot row.
    ///
    /// Rows are returned in a deterministic order (ascending by timestamp,
    /// then country code) so that downstream tie-breaking on duplicate
    /// `(timestamp, code)` rows is reproducible.
    async fn fetch_all(&self) -> Result<Vec<CountryEntry>>;

    /// Appends snapshot rows to the store.
    ///
    /// A row with the same `(timestamp, country_code)` as an existing one
    /// replaces it.
    async fn add(&self, entries: &[CountryEntry]) -> Result<()>;

    /// Returns the most recent timestamp in the store, if any rows exist.
    async fn latest(&self) -> Result<Option<NaiveDate>>;
}
