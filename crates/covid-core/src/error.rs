//! Error types for covid19 data operations.
//!
//! This module defines [`CovidError`] which covers all error cases that can
//! occur when fetching, parsing, storing, or serving case data.
//!
//! Data-quality anomalies (non-monotonic counts, negative active totals) are
//! deliberately not errors: the aggregation passes them through unchanged.

use thiserror::Error;

/// Errors that can occur during covid19 data operations.
#[derive(Error, Debug)]
pub enum CovidError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by an upstream provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// The case store failed to read or write rows.
    #[error("Store error: {0}")]
    Store(String),

    /// Error parsing data from a provider.
    #[error("Parse error: {0}")]
    Parse(String),

    /// No provider is configured for the requested operation.
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// Authentication failed for a provider.
    #[error("Authentication failed for provider {0}")]
    AuthenticationFailed(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias using [`CovidError`].
pub type Result<T> = std::result::Result<T, CovidError>;
