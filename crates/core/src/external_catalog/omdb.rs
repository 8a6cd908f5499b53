//! OMDb (Open Movie Database) API client.
//!
//! OMDb authenticates every request with an API key passed as a query
//! parameter. Free keys have a small daily quota, so the caller rotates
//! through a pool of keys; this client only reports which outcome it saw.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::types::{split_cast, Credential, LookupResult};
use super::{CastLookup, ExternalCatalogError};
use crate::config::OmdbConfig;

/// OMDb API client.
pub struct OmdbClient {
    client: Client,
    base_url: String,
}

impl OmdbClient {
    /// Create a new OMDb client.
    ///
    /// API keys are not held by the client; each lookup receives the
    /// credential to use.
    pub fn new(config: &OmdbConfig) -> Result<Self, ExternalCatalogError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ExternalCatalogError::NotConfigured(
                "OMDb base URL is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Query parameters for a title lookup.
    fn query_params<'a>(
        title: &'a str,
        year: Option<&'a str>,
        api_key: &'a str,
    ) -> Vec<(&'static str, &'a str)> {
        let mut params = vec![("t", title)];
        if let Some(y) = year {
            params.push(("y", y));
        }
        params.push(("apikey", api_key));
        params.push(("type", "movie"));
        params
    }

    async fn fetch(
        &self,
        title: &str,
        year: Option<&str>,
        credential: Credential<'_>,
    ) -> Result<LookupResult, ExternalCatalogError> {
        let url = format!("{}/", self.base_url);

        debug!(
            "OMDb lookup: title='{}', year={:?}, key #{}",
            title,
            year,
            credential.index + 1
        );

        let response = self
            .client
            .get(&url)
            .query(&Self::query_params(title, year, credential.token))
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(classify_response(status, &body))
    }
}

#[async_trait]
impl CastLookup for OmdbClient {
    async fn lookup(
        &self,
        title: &str,
        year: Option<&str>,
        credential: Credential<'_>,
    ) -> LookupResult {
        match self.fetch(title, year, credential).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Error fetching cast for '{}': {}", title, e);
                LookupResult::TransientError
            }
        }
    }
}

/// Map an OMDb HTTP response onto a [`LookupResult`].
///
/// - 401 and 429 rotate the key (OMDb answers an exhausted daily quota with 401).
/// - Any other non-2xx status and unparsable bodies are transient.
/// - `"Response": "False"` means the title is unknown.
pub fn classify_response(status: u16, body: &str) -> LookupResult {
    match status {
        401 | 429 => {
            warn!("OMDb rejected the API key (HTTP {})", status);
            return LookupResult::RateLimited;
        }
        200..=299 => {}
        _ => {
            warn!("OMDb returned HTTP {}", status);
            return LookupResult::TransientError;
        }
    }

    let parsed: OmdbTitleResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Failed to parse title response: {}", e);
            return LookupResult::TransientError;
        }
    };

    if !parsed.response.eq_ignore_ascii_case("true") {
        debug!(
            "Movie not found in OMDb: {}",
            parsed.error.as_deref().unwrap_or("Unknown error")
        );
        return LookupResult::NotFound;
    }

    let cast = split_cast(parsed.actors.as_deref().unwrap_or_default());
    if cast.is_empty() {
        LookupResult::NotFound
    } else {
        LookupResult::Found(cast)
    }
}

// ============================================================================
// OMDb API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct OmdbTitleResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Actors", default)]
    actors: Option<String>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}
