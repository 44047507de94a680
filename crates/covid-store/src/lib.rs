#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/covid19-data/covid19/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Store implementations for covid19 case snapshot rows.
//!
//! This crate provides implementations of the
//! [`CaseStore`](covid_core::CaseStore) trait:
//!
//! - [`InMemoryStore`] - `HashMap`-backed, for testing and development
//! - [`SqliteStore`] - SQLite-backed persistence (requires the `sqlite` feature)

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::InMemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
