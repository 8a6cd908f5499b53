//! Mock cast lookup for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::external_catalog::{CastLookup, Credential, LookupResult};

/// A recorded lookup for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedLookup {
    pub title: String,
    pub year: Option<String>,
    pub credential_index: usize,
}

/// Mock implementation of the CastLookup trait.
///
/// Provides controllable behavior for testing:
/// - Scripted results per title, consumed in order
/// - A fallback result for unscripted titles
/// - Credentials that are always rate limited
/// - Recorded lookups for assertions
///
/// Clones share state, so a test can keep a handle after moving one into an
/// enricher.
///
/// # Example
///
/// ```rust,ignore
/// use marquee_core::testing::MockCastLookup;
///
/// let lookup = MockCastLookup::new();
/// lookup.set_cast("Vikram", &["Kamal Haasan"]).await;
/// lookup.limit_credential(0).await;
/// ```
#[derive(Debug, Clone)]
pub struct MockCastLookup {
    /// Scripted results by title.
    scripted: Arc<RwLock<HashMap<String, VecDeque<LookupResult>>>>,
    /// Result for titles with no script left.
    fallback: Arc<RwLock<LookupResult>>,
    /// Credential indices that always answer `RateLimited`.
    limited: Arc<RwLock<HashSet<usize>>>,
    /// Recorded lookups.
    lookups: Arc<RwLock<Vec<RecordedLookup>>>,
}

impl Default for MockCastLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCastLookup {
    /// Create a mock that answers `NotFound` for everything.
    pub fn new() -> Self {
        Self {
            scripted: Arc::new(RwLock::new(HashMap::new())),
            fallback: Arc::new(RwLock::new(LookupResult::NotFound)),
            limited: Arc::new(RwLock::new(HashSet::new())),
            lookups: Arc::new(RwLock::new(Vec::new())),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Queue a result for the next lookup of `title`.
    pub async fn push_result(&self, title: &str, result: LookupResult) {
        self.scripted
            .write()
            .await
            .entry(title.to_string())
            .or_default()
            .push_back(result);
    }

    /// Answer the next lookup of `title` with the given cast.
    pub async fn set_cast(&self, title: &str, cast: &[&str]) {
        let cast = cast.iter().map(|c| c.to_string()).collect();
        self.push_result(title, LookupResult::Found(cast)).await;
    }

    /// Result used once a title has no scripted results left.
    pub async fn set_fallback(&self, result: LookupResult) {
        *self.fallback.write().await = result;
    }

    /// Make every lookup with credential `index` rate limited.
    pub async fn limit_credential(&self, index: usize) {
        self.limited.write().await.insert(index);
    }

    // =========================================================================
    // Lookup Recording
    // =========================================================================

    /// Get all recorded lookups.
    pub async fn recorded_lookups(&self) -> Vec<RecordedLookup> {
        self.lookups.read().await.clone()
    }

    /// Get the number of lookups performed.
    pub async fn lookup_count(&self) -> usize {
        self.lookups.read().await.len()
    }

    /// Titles looked up, in call order.
    pub async fn looked_up_titles(&self) -> Vec<String> {
        self.lookups
            .read()
            .await
            .iter()
            .map(|l| l.title.clone())
            .collect()
    }
}

#[async_trait]
impl CastLookup for MockCastLookup {
    async fn lookup(
        &self,
        title: &str,
        year: Option<&str>,
        credential: Credential<'_>,
    ) -> LookupResult {
        self.lookups.write().await.push(RecordedLookup {
            title: title.to_string(),
            year: year.map(str::to_string),
            credential_index: credential.index,
        });

        if self.limited.read().await.contains(&credential.index) {
            return LookupResult::RateLimited;
        }

        let scripted = self
            .scripted
            .write()
            .await
            .get_mut(title)
            .and_then(VecDeque::pop_front);

        match scripted {
            Some(result) => result,
            None => self.fallback.read().await.clone(),
        }
    }
}
