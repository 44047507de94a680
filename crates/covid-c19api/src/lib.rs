#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/covid19-data/covid19/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! covid19api.com snapshot provider.
//!
//! This crate implements [`SnapshotProvider`] for the keyless
//! [covid19api.com](https://covid19api.com/) summary endpoint. Every country
//! row in the summary already carries its own country code, so no lookup
//! table is required.
//!
//! # Example
//!
//! ```no_run
//! use covid_c19api::C19ApiProvider;
//! use covid_core::SnapshotProvider;
//!
//! # async fn example() -> covid_core::Result<()> {
//! let provider = C19ApiProvider::new();
//! let snapshots = provider.fetch_snapshots().await?;
//! println!("Fetched {} countries", snapshots.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use covid_core::{CountryEntry, CovidError, Result, SnapshotProvider};
use serde::Deserialize;
use tracing::debug;

/// Base URL for the covid19api.com API.
const C19API_BASE_URL: &str = "https://api.covid19api.com";

/// User agent for HTTP requests.
const USER_AGENT: &str = "covid19-data/0.1";

/// covid19api.com summary snapshot provider.
///
/// Implements [`SnapshotProvider`].
#[derive(Debug)]
pub struct C19ApiProvider {
    client: reqwest::Client,
}

impl C19ApiProvider {
    /// Create a new covid19api.com provider with default settings.
    #[must_use]
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }

    /// Create a new covid19api.com provider with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for C19ApiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotProvider for C19ApiProvider {
    fn name(&self) -> &str {
        "covid19api"
    }

    fn description(&self) -> &str {
        "covid19api.com country summary"
    }

    async fn fetch_snapshots(&self) -> Result<Vec<CountryEntry>> {
        let url = format!("{C19API_BASE_URL}/summary");
        debug!("covid19api request: summary");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CovidError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CovidError::RateLimited {
                provider: "covid19api".to_string(),
                retry_after: None,
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(CovidError::Network(format!("HTTP {status}: {text}")));
        }

        let summary: Summary = response
            .json()
            .await
            .map_err(|e| CovidError::Parse(e.to_string()))?;

        let mut entries = Vec::with_capacity(summary.countries.len());
        for country in summary.countries {
            entries.push(CountryEntry::new(
                country.date.date_naive(),
                country.country_code,
                country.country,
                country.total_confirmed,
                country.total_recovered,
                country.total_deaths,
            ));
        }

        entries.sort_by(|a, b| a.country_code.as_str().cmp(b.country_code.as_str()));
        Ok(entries)
    }
}

/// Top-level summary response.
#[derive(Debug, Deserialize)]
struct Summary {
    #[serde(rename = "Countries")]
    countries: Vec<CountrySummary>,
}

/// One country row of the summary response.
#[derive(Debug, Deserialize)]
struct CountrySummary {
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "CountryCode")]
    country_code: String,
    #[serde(rename = "TotalConfirmed")]
    total_confirmed: i64,
    #[serde(rename = "TotalRecovered")]
    total_recovered: i64,
    #[serde(rename = "TotalDeaths")]
    total_deaths: i64,
    #[serde(rename = "Date")]
    date: DateTime<Utc>,
}
