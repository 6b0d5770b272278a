//! Static list loader: delimited device lists from a blob store.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::instrument;

use crate::error::BoxError;

/// Read-only blob store holding device-id lists.
#[async_trait]
pub trait BlobStore: Send + Sync {
  /// Fetches one blob as text. Missing or unreadable blobs are errors;
  /// the calling job propagates them without retrying.
  async fn fetch(&self, key: &str) -> Result<String, BoxError>;
}

/// Blob store backed by files under a root directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
  root: PathBuf,
}

impl FsBlobStore {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }
}

#[async_trait]
impl BlobStore for FsBlobStore {
  async fn fetch(&self, key: &str) -> Result<String, BoxError> {
    let path = self.root.join(key);
    Ok(tokio::fs::read_to_string(&path).await?)
  }
}

/// Splits a fetched blob into an ordered device-id list.
///
/// Empty entries are kept: the list order defines the resume index, and the
/// driver skips empties without consuming a rate-limit slot.
#[instrument(level = "trace", skip(text))]
pub fn split_device_list(text: &str, delimiter: &str) -> Vec<String> {
  text.split(delimiter).map(str::to_string).collect()
}
