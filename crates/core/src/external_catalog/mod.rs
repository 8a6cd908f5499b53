//! External catalog integration for cast lookups.
//!
//! This module provides the lookup seam used by the enrichment loop and the
//! OMDb client that implements it over HTTP.

mod omdb;
mod types;

pub use omdb::{classify_response, OmdbClient};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when building or talking to an external catalog.
///
/// Lookups themselves never fail: these are folded into [`LookupResult`]
/// before they reach the enrichment loop.
#[derive(Debug, Error)]
pub enum ExternalCatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Client not configured (missing base URL, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Trait for cast lookup backends.
///
/// Implemented by [`OmdbClient`] and by the mocks in [`crate::testing`].
#[async_trait]
pub trait CastLookup: Send + Sync {
    /// Look up the cast of `title`, optionally narrowed by release `year`.
    async fn lookup(
        &self,
        title: &str,
        year: Option<&str>,
        credential: Credential<'_>,
    ) -> LookupResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_cast_trims_members() {
        assert_eq!(
            split_cast("Vijay, Trisha Krishnan ,  Sanjay Dutt"),
            vec!["Vijay", "Trisha Krishnan", "Sanjay Dutt"]
        );
    }

    #[test]
    fn test_split_cast_not_available() {
        assert!(split_cast("N/A").is_empty());
        assert!(split_cast("   ").is_empty());
        assert!(split_cast(",, ,").is_empty());
    }

    #[test]
    fn test_lookup_result_labels() {
        assert_eq!(LookupResult::Found(vec![]).label(), "found");
        assert_eq!(LookupResult::RateLimited.label(), "rate_limited");
        assert_eq!(LookupResult::TransientError.label(), "transient_error");
    }
}
