#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/covid19-data/covid19/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Memoizing cache for the aggregated global covid19 series.
//!
//! [`SeriesCache`] owns a [`CaseStore`](covid_core::CaseStore), lazily runs
//! the aggregation from [`covid_core::aggregate`], memoizes the result for a
//! retention window, and answers range-bounded queries with at most one
//! in-flight recomputation under concurrent readers.

mod series;

pub use series::SeriesCache;
