#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/covid19-data/covid19/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! RapidAPI COVID-19 statistics snapshot provider.
//!
//! This crate implements [`SnapshotProvider`] for the
//! [RapidAPI COVID-19 statistics](https://rapidapi.com/KishCom/api/covid-19-coronavirus-statistics)
//! API.
//!
//! The API reports one row per region (country, province, or city); rows are
//! summed into one cumulative snapshot per country, and country names are
//! resolved to codes through an injected [`CountryTable`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use covid_rapidapi::RapidApiProvider;
//! use covid_core::SnapshotProvider;
//!
//! #[tokio::main]
//! async fn main() -> covid_core::Result<()> {
//!     let provider = RapidApiProvider::new("your_api_key", country_table);
//!     let snapshots = provider.fetch_snapshots().await?;
//!     println!("Fetched {} countries", snapshots.len());
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use covid_core::{CountryEntry, CountryTable, CovidError, Result, SnapshotProvider};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Base URL for the RapidAPI COVID-19 statistics API.
const RAPIDAPI_BASE_URL: &str = "https://covid-19-coronavirus-statistics.p.rapidapi.com";

/// RapidAPI host header value.
const RAPIDAPI_HOST: &str = "covid-19-coronavirus-statistics.p.rapidapi.com";

/// RapidAPI COVID-19 statistics snapshot provider.
///
/// Implements [`SnapshotProvider`].
#[derive(Clone)]
pub struct RapidApiProvider {
    client: Client,
    api_key: String,
    countries: CountryTable,
}

impl fmt::Debug for RapidApiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RapidApiProvider")
            .field("api_key", &"[REDACTED]")
            .field("countries", &self.countries.len())
            .finish()
    }
}

impl RapidApiProvider {
    /// Create a new RapidAPI provider with the given API key and country table.
    #[must_use]
    pub fn new(api_key: impl Into<String>, countries: CountryTable) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            countries,
        }
    }

    /// Create a new RapidAPI provider with a custom HTTP client.
    #[must_use]
    pub fn with_client(
        client: Client,
        api_key: impl Into<String>,
        countries: CountryTable,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            countries,
        }
    }

    /// Make a GET request and parse the JSON response.
    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{RAPIDAPI_BASE_URL}/{endpoint}");
        debug!("RapidAPI request: {}", endpoint);

        let response = self
            .client
            .get(&url)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", RAPIDAPI_HOST)
            .send()
            .await
            .map_err(|e| CovidError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CovidError::RateLimited {
                provider: "RapidAPI".to_string(),
                retry_after: None,
            });
        }

        if response.status() == reqwest::StatusCode::FORBIDDEN
            || response.status() == reqwest::StatusCode::UNAUTHORIZED
        {
            return Err(CovidError::AuthenticationFailed("RapidAPI".to_string()));
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(CovidError::Network(format!("HTTP {status}: {text}")));
        }

        let text = response
            .text()
            .await
            .map_err(|e| CovidError::Network(e.to_string()))?;

        serde_json::from_str(&text).map_err(|e| CovidError::Parse(format!("{e}: {text}")))
    }
}

#[async_trait]
impl SnapshotProvider for RapidApiProvider {
    fn name(&self) -> &str {
        "RapidAPI"
    }

    fn description(&self) -> &str {
        "RapidAPI COVID-19 coronavirus statistics"
    }

    async fn fetch_snapshots(&self) -> Result<Vec<CountryEntry>> {
        let response: StatsResponse = self.get("v1/stats").await?;

        let timestamp = response
            .data
            .last_checked
            .parse::<DateTime<Utc>>()
            .map_err(|e| {
                CovidError::Parse(format!(
                    "Invalid lastChecked {}: {e}",
                    response.data.last_checked
                ))
            })?
            .date_naive();

        Ok(entries_from_stats(
            &response.data.covid19_stats,
            timestamp,
            &self.countries,
        ))
    }
}

/// Sums per-region rows into one snapshot per country and resolves country
/// names to codes. Countries missing from the table are skipped.
fn entries_from_stats(
    stats: &[RegionStat],
    timestamp: NaiveDate,
    countries: &CountryTable,
) -> Vec<CountryEntry> {
    let mut totals: HashMap<&str, (i64, i64, i64)> = HashMap::new();
    for stat in stats {
        let entry = totals.entry(stat.country.as_str()).or_default();
        entry.0 += stat.confirmed.unwrap_or(0);
        entry.1 += stat.recovered.unwrap_or(0);
        entry.2 += stat.deaths.unwrap_or(0);
    }

    let mut entries = Vec::with_capacity(totals.len());
    for (name, (confirmed, recovered, deaths)) in totals {
        let Some(code) = countries.code_for_name(name) else {
            debug!(country = name, "Unknown country, skipping");
            continue;
        };
        entries.push(CountryEntry::new(
            timestamp,
            code.clone(),
            name,
            confirmed,
            recovered,
            deaths,
        ));
    }

    // HashMap iteration order is arbitrary; trait contract wants
    // deterministic output.
    entries.sort_by(|a, b| a.country_code.as_str().cmp(b.country_code.as_str()));
    entries
}

/// Top-level response of the stats endpoint.
#[derive(Debug, Deserialize)]
struct StatsResponse {
    data: StatsData,
}

/// Payload of the stats endpoint.
#[derive(Debug, Deserialize)]
struct StatsData {
    #[serde(rename = "lastChecked")]
    last_checked: String,
    #[serde(rename = "covid19Stats")]
    covid19_stats: Vec<RegionStat>,
}

/// One per-region row as reported by the API.
#[derive(Debug, Deserialize)]
struct RegionStat {
    country: String,
    confirmed: Option<i64>,
    recovered: Option<i64>,
    deaths: Option<i64>,
}
