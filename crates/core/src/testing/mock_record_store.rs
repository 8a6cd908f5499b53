//! Mock record store for testing.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::enrichment::MovieRecord;
use crate::store::{CheckpointSink, RecordStore, StoreError};

/// In-memory implementation of RecordStore and CheckpointSink.
///
/// Keeps every saved snapshot so tests can count checkpoints and inspect
/// what was written at each one. Saves can be made to fail selectively.
#[derive(Debug, Clone, Default)]
pub struct MockRecordStore {
    /// Records returned by `load`.
    records: Arc<RwLock<Vec<MovieRecord>>>,
    /// Every successful save, in order.
    saves: Arc<RwLock<Vec<Vec<MovieRecord>>>>,
    /// Number of save attempts so far (including failed ones).
    attempts: Arc<RwLock<usize>>,
    /// 1-based save attempts that should fail.
    failing_attempts: Arc<RwLock<Vec<usize>>>,
    /// If set, `load` fails.
    fail_load: Arc<RwLock<bool>>,
}

impl MockRecordStore {
    /// Create a store holding `records`.
    pub fn with_records(records: Vec<MovieRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
            ..Self::default()
        }
    }

    /// Make the `n`-th save attempt (1-based) fail.
    pub async fn fail_save(&self, n: usize) {
        self.failing_attempts.write().await.push(n);
    }

    /// Make `load` fail.
    pub async fn fail_load(&self) {
        *self.fail_load.write().await = true;
    }

    /// All successful saves, oldest first.
    pub async fn saves(&self) -> Vec<Vec<MovieRecord>> {
        self.saves.read().await.clone()
    }

    /// Number of successful saves.
    pub async fn save_count(&self) -> usize {
        self.saves.read().await.len()
    }

    /// The most recent successful save.
    pub async fn last_save(&self) -> Option<Vec<MovieRecord>> {
        self.saves.read().await.last().cloned()
    }

    fn injected_error() -> StoreError {
        StoreError::Io {
            path: PathBuf::from("mock://records.json"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "injected failure"),
        }
    }
}

#[async_trait]
impl CheckpointSink for MockRecordStore {
    async fn save(&self, records: &[MovieRecord]) -> Result<(), StoreError> {
        let attempt = {
            let mut attempts = self.attempts.write().await;
            *attempts += 1;
            *attempts
        };

        if self.failing_attempts.read().await.contains(&attempt) {
            return Err(Self::injected_error());
        }

        self.saves.write().await.push(records.to_vec());
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn load(&self) -> Result<Vec<MovieRecord>, StoreError> {
        if *self.fail_load.read().await {
            return Err(Self::injected_error());
        }
        Ok(self.records.read().await.clone())
    }
}
