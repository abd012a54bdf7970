use super::{BlobStore, DeleteOutcome, is_valid_blob_name};
use crate::config::settings::StorageConfig;
use crate::errors::{Error, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Blob store backed by a directory on the local filesystem.
///
/// Blobs are written to `root/{name}` and are expected to be served by a
/// static file server under `base_url`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    /// Creates a store writing under `root` and serving from `base_url`.
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Creates a store from the `[storage]` settings.
    #[must_use]
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.root.clone(), config.base_url.clone())
    }

    /// Directory blobs are written to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        if !is_valid_blob_name(name) {
            return Err(Error::storage(format!("Invalid blob name: {name:?}")));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let path = self.path_for(name)?;
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| Error::storage(format!("Failed to create {}: {e}", self.root.display())))?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| Error::storage(format!("Failed to write blob {name}: {e}")))?;

        debug!("Stored blob at {}", path.display());
        Ok(self.url_for(name))
    }

    fn url_for(&self, name: &str) -> String {
        format!("{}/{name}", self.base_url)
    }

    #[instrument(skip(self))]
    async fn delete(&self, name: &str) -> Result<DeleteOutcome> {
        let path = self.path_for(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(DeleteOutcome::Deleted),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(DeleteOutcome::NotFound),
            Err(e) => Err(Error::storage(format!("Failed to delete blob {name}: {e}"))),
        }
    }
}
