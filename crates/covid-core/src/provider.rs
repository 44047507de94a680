//! Provider trait for fetching case snapshots from upstream APIs.
//!
//! This module defines [`SnapshotProvider`], implemented by the upstream
//! API client crates (`covid-rapidapi`, `covid-c19api`).

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::Result, types::CountryEntry};

/// Trait for upstream case snapshot providers.
///
/// A provider returns the latest cumulative counts per reporting country.
/// Implementations own their HTTP plumbing; callers see only typed rows.
#[async_trait]
pub trait SnapshotProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "RapidAPI").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;

    /// Fetches the latest snapshot for every reporting country.
    ///
    /// Each returned row carries the country's cumulative counts as of the
    /// provider's current reporting date. Countries the provider cannot
    /// resolve to a known code are skipped, not errors.
    async fn fetch_snapshots(&self) -> Result<Vec<CountryEntry>>;
}
