//! Core data types for covid19 case data.
//!
//! This module defines the fundamental data structures:
//!
//! - [`CountryCode`] - ISO-style two-letter country code
//! - [`CountryEntry`] - One country's reported cumulative counts on one date
//! - [`AggregatedEntry`] - One point of the derived global series
//! - [`CountryInfo`] / [`CountryTable`] - Read-only country reference data

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A two-letter country code.
///
/// Codes are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CountryCode(String);

impl CountryCode {
    /// Creates a new country code from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().to_uppercase())
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CountryCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for CountryCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CountryCode {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// One snapshot of one country's cumulative case counts as of one date.
///
/// Counts are cumulative since the start of reporting, not daily increments.
/// They are non-negative and non-decreasing per country in well-formed data,
/// but neither property is enforced; see [`crate::aggregate`] for how
/// inconsistent data flows through unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryEntry {
    /// Reporting date (day granularity).
    pub timestamp: NaiveDate,
    /// Country code.
    pub country_code: CountryCode,
    /// Human-readable country name.
    pub country_name: String,
    /// Cumulative confirmed cases.
    pub confirmed: i64,
    /// Cumulative recoveries.
    pub recovered: i64,
    /// Cumulative deaths.
    pub deaths: i64,
}

impl CountryEntry {
    /// Creates a new snapshot row.
    #[must_use]
    pub fn new(
        timestamp: NaiveDate,
        country_code: impl Into<CountryCode>,
        country_name: impl Into<String>,
        confirmed: i64,
        recovered: i64,
        deaths: i64,
    ) -> Self {
        Self {
            timestamp,
            country_code: country_code.into(),
            country_name: country_name.into(),
            confirmed,
            recovered,
            deaths,
        }
    }
}

/// One point of the derived global series.
///
/// Produced only by [`crate::aggregate`]; immutable once created. `active`
/// is derived as `confirmed - recovered - deaths` and may be negative when
/// the source data is inconsistent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedEntry {
    /// Date of this point.
    pub timestamp: NaiveDate,
    /// Global confirmed cases.
    pub confirmed: i64,
    /// Global recoveries.
    pub recovered: i64,
    /// Global deaths.
    pub deaths: i64,
    /// Global active cases (`confirmed - recovered - deaths`).
    pub active: i64,
}

impl AggregatedEntry {
    /// Creates a new aggregated point, deriving the active count.
    #[must_use]
    pub const fn new(timestamp: NaiveDate, confirmed: i64, recovered: i64, deaths: i64) -> Self {
        Self {
            timestamp,
            confirmed,
            recovered,
            deaths,
            active: confirmed - recovered - deaths,
        }
    }
}

/// Reference information for one country.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryInfo {
    /// Country code.
    pub code: CountryCode,
    /// Country name as reported upstream.
    pub name: String,
    /// Population, where known.
    pub population: Option<u64>,
}

impl CountryInfo {
    /// Creates new country info with required fields.
    #[must_use]
    pub fn new(code: impl Into<CountryCode>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            population: None,
        }
    }

    /// Sets the population.
    #[must_use]
    pub const fn with_population(mut self, population: u64) -> Self {
        self.population = Some(population);
        self
    }
}

/// Read-only lookup table of country reference data.
///
/// Handlers and providers receive this as injected configuration; it is not
/// process-wide state. Lookups work by code or by upstream-reported name.
#[derive(Clone, Debug, Default)]
pub struct CountryTable {
    by_code: HashMap<CountryCode, CountryInfo>,
    by_name: HashMap<String, CountryCode>,
}

impl CountryTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of countries in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Looks up a country by code.
    #[must_use]
    pub fn get(&self, code: &CountryCode) -> Option<&CountryInfo> {
        self.by_code.get(code)
    }

    /// Resolves an upstream-reported country name to its code.
    #[must_use]
    pub fn code_for_name(&self, name: &str) -> Option<&CountryCode> {
        self.by_name.get(name)
    }

    /// Returns an iterator over all countries in the table.
    pub fn iter(&self) -> impl Iterator<Item = &CountryInfo> {
        self.by_code.values()
    }
}

impl FromIterator<CountryInfo> for CountryTable {
    fn from_iter<I: IntoIterator<Item = CountryInfo>>(iter: I) -> Self {
        let mut table = Self::new();
        for info in iter {
            table.by_name.insert(info.name.clone(), info.code.clone());
            table.by_code.insert(info.code.clone(), info);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_code_uppercases() {
        let code = CountryCode::new("be");
        assert_eq!(code.as_str(), "BE");
        assert_eq!(CountryCode::from("Us"), CountryCode::new("US"));
    }

    #[test]
    fn aggregated_entry_derives_active() {
        let date = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let entry = AggregatedEntry::new(date, 10, 3, 2);
        assert_eq!(entry.active, 5);

        // Inconsistent source data yields a negative active count, unchanged.
        let entry = AggregatedEntry::new(date, 1, 3, 2);
        assert_eq!(entry.active, -4);
    }

    #[test]
    fn country_table_lookup() {
        let table: CountryTable = [
            CountryInfo::new("BE", "Belgium").with_population(11_589_623),
            CountryInfo::new("US", "United States of America"),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.code_for_name("Belgium"),
            Some(&CountryCode::new("BE"))
        );
        assert!(table.code_for_name("Atlantis").is_none());

        let be = table.get(&CountryCode::new("BE")).unwrap();
        assert_eq!(be.population, Some(11_589_623));
    }
}
