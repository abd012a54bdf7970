use super::{BlobStore, DeleteOutcome, is_valid_blob_name};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-process blob store.
///
/// Useful for tests and local tooling. Uploads and deletes can be made to
/// fail on demand to exercise the asset lifecycle's failure paths.
#[derive(Debug)]
pub struct MemoryBlobStore {
    base_url: String,
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    fail_puts: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryBlobStore {
    /// Creates an empty store serving from `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            blobs: Mutex::new(HashMap::new()),
            fail_puts: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent `put` fail (or succeed again).
    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `delete` fail (or succeed again).
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Whether a blob named `name` is stored.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lock().is_ok_and(|blobs| blobs.contains_key(name))
    }

    /// Contents of the blob named `name`, if stored.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.lock().ok().and_then(|blobs| blobs.get(name).cloned())
    }

    /// Number of stored blobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().map_or(0, |blobs| blobs.len())
    }

    /// Whether the store holds no blobs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.blobs
            .lock()
            .map_err(|_| Error::storage("In-memory blob store lock poisoned"))
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<String> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(Error::storage(format!("Simulated upload failure for {name}")));
        }
        if !is_valid_blob_name(name) {
            return Err(Error::storage(format!("Invalid blob name: {name:?}")));
        }

        self.lock()?.insert(name.to_string(), bytes.to_vec());
        Ok(self.url_for(name))
    }

    fn url_for(&self, name: &str) -> String {
        format!("{}/{name}", self.base_url)
    }

    async fn delete(&self, name: &str) -> Result<DeleteOutcome> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Error::storage(format!("Simulated delete failure for {name}")));
        }

        Ok(match self.lock()?.remove(name) {
            Some(_) => DeleteOutcome::Deleted,
            None => DeleteOutcome::NotFound,
        })
    }
}
