//! Snapshot provider registry with fallback and store ingestion.

use std::sync::Arc;

use tracing::{debug, warn};

use covid_core::{CaseStore, CountryEntry, CovidError, Result, SnapshotProvider};

/// Registry of snapshot providers with automatic fallback.
///
/// Providers are tried in registration order until one returns snapshots;
/// failures are logged and the next provider is consulted. [`ingest`]
/// additionally appends the fetched snapshots to a [`CaseStore`], which is
/// how new rows enter the system.
///
/// [`ingest`]: SnapshotRegistry::ingest
///
/// # Example
///
/// ```rust,ignore
/// use covid::SnapshotRegistry;
///
/// let registry = SnapshotRegistry::new()
///     .with_rapidapi("api_key", country_table)
///     .with_c19api();
///
/// let stored = registry.ingest(store.as_ref()).await?;
/// ```
#[derive(Default)]
pub struct SnapshotRegistry {
    providers: Vec<Arc<dyn SnapshotProvider>>,
}

impl std::fmt::Debug for SnapshotRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotRegistry")
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl SnapshotRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a snapshot provider.
    pub fn register(&mut self, provider: Arc<dyn SnapshotProvider>) {
        debug!(provider = provider.name(), "Registering snapshot provider");
        self.providers.push(provider);
    }

    /// Fetch the latest country snapshots, trying providers in order until
    /// one succeeds.
    pub async fn fetch_snapshots(&self) -> Result<Vec<CountryEntry>> {
        if self.providers.is_empty() {
            return Err(CovidError::ProviderNotConfigured(
                "No snapshot providers registered".to_string(),
            ));
        }

        let mut last_error = None;
        for provider in &self.providers {
            debug!(provider = provider.name(), "Fetching snapshots");

            match provider.fetch_snapshots().await {
                Ok(snapshots) => {
                    debug!(
                        provider = provider.name(),
                        countries = snapshots.len(),
                        "Fetched snapshots"
                    );
                    return Ok(snapshots);
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Provider failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| CovidError::Other("All providers failed with no error".to_string())))
    }

    /// Fetch the latest snapshots and append them to the store.
    ///
    /// Returns the number of rows handed to the store. Rows that repeat an
    /// existing `(timestamp, country)` pair replace the earlier ones; the
    /// store makes that deterministic.
    pub async fn ingest(&self, store: &dyn CaseStore) -> Result<usize> {
        let snapshots = self.fetch_snapshots().await?;
        if snapshots.is_empty() {
            debug!("No snapshots to ingest");
            return Ok(0);
        }

        store.add(&snapshots).await?;
        debug!(rows = snapshots.len(), "Ingested snapshots");
        Ok(snapshots.len())
    }

    // Builder methods for easy setup with specific providers

    /// Add the RapidAPI provider.
    #[cfg(feature = "rapidapi")]
    #[must_use]
    pub fn with_rapidapi(
        mut self,
        api_key: &str,
        countries: covid_core::CountryTable,
    ) -> Self {
        self.register(Arc::new(covid_rapidapi::RapidApiProvider::new(
            api_key, countries,
        )));
        self
    }

    /// Add the covid19api.com provider.
    #[cfg(feature = "c19api")]
    #[must_use]
    pub fn with_c19api(mut self) -> Self {
        self.register(Arc::new(covid_c19api::C19ApiProvider::new()));
        self
    }
}
