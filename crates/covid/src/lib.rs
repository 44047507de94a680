#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/covid19-data/covid19/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Unified interface for covid19 case data.
//!
//! This crate re-exports the core types, the series cache, and the store
//! implementations, and provides a [`SnapshotRegistry`] for ingesting
//! snapshots from multiple upstream providers with automatic fallback.
//!
//! # Features
//!
//! - `rapidapi` - RapidAPI COVID-19 statistics provider
//! - `c19api` - covid19api.com summary provider
//! - `store-sqlite` - SQLite-backed case store
//!
//! # Example
//!
//! ```rust,ignore
//! use covid::{SeriesCache, SnapshotRegistry, SqliteStore};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> covid::Result<()> {
//!     let store = Arc::new(SqliteStore::new("covid.db")?);
//!
//!     // Ingest the latest per-country snapshots.
//!     let registry = SnapshotRegistry::new().with_c19api();
//!     registry.ingest(store.as_ref()).await?;
//!
//!     // Serve the derived global series with bounded staleness.
//!     let cache = SeriesCache::new(store, Duration::from_secs(300));
//!     let totals = cache.totals(chrono::Utc::now().date_naive()).await?;
//!     println!("{} points", totals.len());
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use covid_core::*;

// Series cache
pub use covid_cache::SeriesCache;

// Store implementations
pub use covid_store::InMemoryStore;
#[cfg(feature = "store-sqlite")]
pub use covid_store::SqliteStore;

// Providers
#[cfg(feature = "c19api")]
pub use covid_c19api::C19ApiProvider;
#[cfg(feature = "rapidapi")]
pub use covid_rapidapi::RapidApiProvider;

mod registry;
pub use registry::SnapshotRegistry;
