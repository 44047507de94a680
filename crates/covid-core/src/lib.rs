#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/covid19-data/covid19/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and traits for covid19 case data.
//!
//! This crate provides the foundational abstractions for the workspace:
//!
//! - [`CountryEntry`](types::CountryEntry) / [`AggregatedEntry`](types::AggregatedEntry) - snapshot rows and series points
//! - [`aggregate::accumulate`] / [`aggregate::delta`] - the aggregation algorithm
//! - [`CaseStore`](store::CaseStore) - persisted row store abstraction
//! - [`SnapshotProvider`](provider::SnapshotProvider) - upstream API clients

/// Aggregation of snapshot rows into global daily series.
pub mod aggregate;
/// Error types for data operations.
pub mod error;
/// Provider trait for upstream case snapshot APIs.
pub mod provider;
/// Store trait for persisted snapshot rows.
pub mod store;
/// Core data types (country codes, snapshot rows, series points).
pub mod types;

// Re-export commonly used items at crate root
pub use error::{CovidError, Result};
pub use provider::SnapshotProvider;
pub use store::CaseStore;
pub use types::{AggregatedEntry, CountryCode, CountryEntry, CountryInfo, CountryTable};
