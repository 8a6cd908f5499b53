//! Flat JSON file persistence.
//!
//! Both pipelines keep their data as a single pretty-printed JSON array
//! that is read in full and rewritten in full.

mod json;

pub use json::{read_json_array, read_json_array_or_default, write_json_array, MovieStore};

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::enrichment::MovieRecord;

/// Errors that can occur when reading or writing a JSON store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store file does not exist.
    #[error("Store file not found: {0}")]
    NotFound(PathBuf),

    /// Reading or writing the file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON of the expected shape.
    #[error("Invalid JSON in {path}: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serializing records failed.
    #[error("Failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Destination for partial progress written during a long run.
#[async_trait]
pub trait CheckpointSink: Send + Sync {
    /// Persist the full record sequence in output order.
    async fn save(&self, records: &[MovieRecord]) -> Result<(), StoreError>;
}

/// A store records can be loaded from and written back to.
#[async_trait]
pub trait RecordStore: CheckpointSink {
    /// Load the full record sequence.
    async fn load(&self) -> Result<Vec<MovieRecord>, StoreError>;
}
