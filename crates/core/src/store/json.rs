use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{CheckpointSink, RecordStore, StoreError};
use crate::enrichment::MovieRecord;

/// Read a JSON array from `path`.
pub async fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_slice(&bytes).map_err(|source| StoreError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a JSON array, treating a missing file as empty.
///
/// An unreadable or malformed file is still an error so that existing data
/// is never silently replaced.
pub async fn read_json_array_or_default<T: DeserializeOwned>(
    path: &Path,
) -> Result<Vec<T>, StoreError> {
    match read_json_array(path).await {
        Err(StoreError::NotFound(_)) => Ok(Vec::new()),
        other => other,
    }
}

/// Write `items` as a pretty-printed JSON array.
///
/// The data goes to a sibling `.tmp` file first and is renamed over `path`,
/// so an interrupted write leaves the previous contents in place.
pub async fn write_json_array<T: Serialize>(path: &Path, items: &[T]) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(items)?;
    let tmp_path = temp_path_for(path);

    tokio::fs::write(&tmp_path, &bytes)
        .await
        .map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("Wrote {} items to {}", items.len(), path.display());
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "store.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Movie catalog file pair: records are read from `input` and every write
/// (checkpoints and the final save) goes to `output`.
#[derive(Debug, Clone)]
pub struct MovieStore {
    input: PathBuf,
    output: PathBuf,
}

impl MovieStore {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }

    /// Read and write the same file.
    pub fn in_place(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::new(path.clone(), path)
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}

#[async_trait]
impl RecordStore for MovieStore {
    async fn load(&self) -> Result<Vec<MovieRecord>, StoreError> {
        read_json_array(&self.input).await
    }
}

#[async_trait]
impl CheckpointSink for MovieStore {
    async fn save(&self, records: &[MovieRecord]) -> Result<(), StoreError> {
        write_json_array(&self.output, records).await
    }
}
