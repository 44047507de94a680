//! Aggregation of per-country snapshot rows into global daily series.
//!
//! Two pure functions transform a flat list of [`CountryEntry`] rows:
//!
//! - [`accumulate`] - global cumulative series, one point per distinct
//!   reporting date, carrying each country's last known counts forward
//! - [`delta`] - the corresponding incremental (day-over-day) series
//!
//! Both are deterministic and side-effect-free; all running state is local
//! to a single call. Data-quality anomalies (non-monotonic counts, negative
//! active totals) pass through unchanged.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::types::{AggregatedEntry, CountryCode, CountryEntry};

/// Builds the global cumulative series from per-country snapshot rows.
///
/// Rows are grouped by reporting date. The distinct dates present in the
/// input, ascending, define the output x-axis; dates with no reports
/// anywhere are absent (no interpolation). Walking dates in order, each
/// country's row replaces its previous snapshot, and every point sums the
/// last known counts of all countries seen so far (carry-forward).
///
/// Duplicate `(timestamp, code)` rows: the last row in input order wins.
/// Empty input yields an empty series.
#[must_use]
pub fn accumulate(entries: &[CountryEntry]) -> Vec<AggregatedEntry> {
    let mut buckets: HashMap<NaiveDate, Vec<&CountryEntry>> = HashMap::new();
    for entry in entries {
        buckets.entry(entry.timestamp).or_default().push(entry);
    }

    let mut timestamps: Vec<NaiveDate> = buckets.keys().copied().collect();
    timestamps.sort_unstable();

    let mut last_known: HashMap<&CountryCode, (i64, i64, i64)> = HashMap::new();
    let mut series = Vec::with_capacity(timestamps.len());

    for timestamp in timestamps {
        for entry in &buckets[&timestamp] {
            // A country's row for a date fully replaces its previous
            // snapshot; counts are cumulative, not additive within the date.
            last_known.insert(
                &entry.country_code,
                (entry.confirmed, entry.recovered, entry.deaths),
            );
        }

        let mut confirmed = 0;
        let mut recovered = 0;
        let mut deaths = 0;
        for &(c, r, d) in last_known.values() {
            confirmed += c;
            recovered += r;
            deaths += d;
        }

        series.push(AggregatedEntry::new(timestamp, confirmed, recovered, deaths));
    }

    series
}

/// Builds the incremental series from a cumulative series.
///
/// Each field is `current - previous`, with `previous` initialized to zero,
/// so the first delta point equals the first cumulative point verbatim.
/// Negative deltas from non-monotonic input pass through unchanged.
#[must_use]
pub fn delta(totals: &[AggregatedEntry]) -> Vec<AggregatedEntry> {
    let mut previous = (0, 0, 0);

    totals
        .iter()
        .map(|total| {
            let entry = AggregatedEntry::new(
                total.timestamp,
                total.confirmed - previous.0,
                total.recovered - previous.1,
                total.deaths - previous.2,
            );
            previous = (total.confirmed, total.recovered, total.deaths);
            entry
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, day).unwrap()
    }

    fn sample_rows() -> Vec<CountryEntry> {
        vec![
            CountryEntry::new(date(1), "BE", "Belgium", 1, 0, 0),
            CountryEntry::new(date(2), "US", "United States", 3, 0, 0),
            CountryEntry::new(date(2), "BE", "Belgium", 3, 1, 0),
            CountryEntry::new(date(4), "US", "United States", 10, 5, 1),
        ]
    }

    #[test]
    fn accumulate_sums_and_carries_forward() {
        let totals = accumulate(&sample_rows());

        assert_eq!(
            totals,
            vec![
                AggregatedEntry::new(date(1), 1, 0, 0),
                AggregatedEntry::new(date(2), 6, 1, 0),
                // BE did not report on the 4th; its counts from the 2nd
                // carry forward.
                AggregatedEntry::new(date(4), 13, 6, 1),
            ]
        );
        assert_eq!(totals[1].active, 5);
        assert_eq!(totals[2].active, 6);
    }

    #[test]
    fn delta_matches_expected_series() {
        let deltas = delta(&accumulate(&sample_rows()));

        assert_eq!(
            deltas,
            vec![
                AggregatedEntry::new(date(1), 1, 0, 0),
                AggregatedEntry::new(date(2), 5, 1, 0),
                AggregatedEntry::new(date(4), 7, 5, 1),
            ]
        );
        assert_eq!(deltas[1].active, 4);
        assert_eq!(deltas[2].active, 1);
    }

    #[test]
    fn empty_input_yields_empty_series() {
        let totals = accumulate(&[]);
        assert!(totals.is_empty());
        assert!(delta(&totals).is_empty());
    }

    #[test]
    fn single_report_steps_once_and_persists() {
        let rows = vec![
            CountryEntry::new(date(1), "BE", "Belgium", 5, 1, 0),
            CountryEntry::new(date(3), "US", "United States", 2, 0, 0),
            CountryEntry::new(date(7), "US", "United States", 4, 0, 0),
        ];

        let totals = accumulate(&rows);
        // BE's single report contributes to every later point unchanged.
        assert_eq!(totals[1], AggregatedEntry::new(date(3), 7, 1, 0));
        assert_eq!(totals[2], AggregatedEntry::new(date(7), 9, 1, 0));

        // ... and to exactly one delta point.
        let deltas = delta(&totals);
        let be_contributions: Vec<_> = deltas.iter().filter(|d| d.recovered == 1).collect();
        assert_eq!(be_contributions.len(), 1);
        assert_eq!(be_contributions[0].timestamp, date(1));
    }

    #[test]
    fn totals_reconstruct_from_deltas() {
        let totals = accumulate(&sample_rows());
        let deltas = delta(&totals);

        let mut running = (0, 0, 0, 0);
        for (total, d) in totals.iter().zip(&deltas) {
            running = (
                running.0 + d.confirmed,
                running.1 + d.recovered,
                running.2 + d.deaths,
                running.3 + d.active,
            );
            assert_eq!(
                (total.confirmed, total.recovered, total.deaths, total.active),
                running
            );
        }
    }

    #[test]
    fn accumulate_is_idempotent() {
        let rows = sample_rows();
        assert_eq!(accumulate(&rows), accumulate(&rows));
    }

    #[test]
    fn duplicate_rows_last_in_input_order_wins() {
        let rows = vec![
            CountryEntry::new(date(1), "BE", "Belgium", 1, 0, 0),
            CountryEntry::new(date(1), "BE", "Belgium", 9, 2, 1),
        ];

        let totals = accumulate(&rows);
        assert_eq!(totals, vec![AggregatedEntry::new(date(1), 9, 2, 1)]);
    }

    #[test]
    fn non_monotonic_counts_pass_through() {
        let rows = vec![
            CountryEntry::new(date(1), "BE", "Belgium", 10, 0, 0),
            CountryEntry::new(date(2), "BE", "Belgium", 7, 9, 0),
        ];

        let totals = accumulate(&rows);
        // Negative active is a data-quality condition, not an error.
        assert_eq!(totals[1].active, -2);

        let deltas = delta(&totals);
        assert_eq!(deltas[1].confirmed, -3);
    }
}
