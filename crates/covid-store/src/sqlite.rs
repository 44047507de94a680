//! SQLite-based store implementation.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use covid_core::{CaseStore, CountryEntry, CovidError, Result};
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, instrument};

/// SQLite-backed store for case snapshot rows.
///
/// Rows persist across application restarts. The `(timestamp, country_code)`
/// primary key makes `add` an upsert, and `fetch_all` returns rows in
/// ascending `(timestamp, country_code)` order so duplicate handling
/// downstream is deterministic.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new SQLite store at the given path.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| CovidError::Store(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory SQLite store.
    ///
    /// Useful for testing; data is lost when the store is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| CovidError::Store(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| CovidError::Store(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS cases (
                timestamp TEXT NOT NULL,
                country_code TEXT NOT NULL,
                country_name TEXT NOT NULL,
                confirmed INTEGER NOT NULL,
                recovered INTEGER NOT NULL,
                deaths INTEGER NOT NULL,
                stored_at TEXT NOT NULL,
                PRIMARY KEY (timestamp, country_code)
            )",
            [],
        )
        .map_err(|e| CovidError::Store(e.to_string()))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_cases_timestamp ON cases(timestamp)",
            [],
        )
        .map_err(|e| CovidError::Store(e.to_string()))?;

        debug!("SQLite case store schema initialized");
        Ok(())
    }
}

#[async_trait]
impl CaseStore for SqliteStore {
    #[instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<CountryEntry>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| CovidError::Store(e.to_string()))?;

        // Timestamps are stored as ISO dates, so lexicographic order is
        // chronological order.
        let mut stmt = conn
            .prepare(
                "SELECT timestamp, country_code, country_name, confirmed, recovered, deaths
                 FROM cases
                 ORDER BY timestamp ASC, country_code ASC",
            )
            .map_err(|e| CovidError::Store(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            })
            .map_err(|e| CovidError::Store(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            let (timestamp, code, name, confirmed, recovered, deaths) =
                row.map_err(|e| CovidError::Store(e.to_string()))?;
            let timestamp = timestamp
                .parse::<NaiveDate>()
                .map_err(|e| CovidError::Parse(format!("Invalid date {timestamp}: {e}")))?;
            entries.push(CountryEntry::new(
                timestamp, code, name, confirmed, recovered, deaths,
            ));
        }

        debug!("Fetched {} rows", entries.len());
        Ok(entries)
    }

    #[instrument(skip(self, entries), fields(count = entries.len()))]
    async fn add(&self, entries: &[CountryEntry]) -> Result<()> {
        let stored_at = Utc::now().to_rfc3339();

        let conn = self
            .conn
            .lock()
            .map_err(|e| CovidError::Store(e.to_string()))?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| CovidError::Store(e.to_string()))?;

        for entry in entries {
            tx.execute(
                "INSERT OR REPLACE INTO cases
                 (timestamp, country_code, country_name, confirmed, recovered, deaths, stored_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    entry.timestamp.to_string(),
                    entry.country_code.as_str(),
                    entry.country_name,
                    entry.confirmed,
                    entry.recovered,
                    entry.deaths,
                    stored_at
                ],
            )
            .map_err(|e| CovidError::Store(e.to_string()))?;
        }

        tx.commit().map_err(|e| CovidError::Store(e.to_string()))?;
        debug!("Stored {} rows", entries.len());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn latest(&self) -> Result<Option<NaiveDate>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| CovidError::Store(e.to_string()))?;

        let result = conn
            .query_row("SELECT MAX(timestamp) FROM cases", [], |row| {
                row.get::<_, Option<String>>(0)
            })
            .map_err(|e| CovidError::Store(e.to_string()))?;

        match result {
            Some(timestamp) => {
                let timestamp = timestamp
                    .parse::<NaiveDate>()
                    .map_err(|e| CovidError::Parse(format!("Invalid date {timestamp}: {e}")))?;
                Ok(Some(timestamp))
            }
            None => Ok(None),
        }
    }
}
