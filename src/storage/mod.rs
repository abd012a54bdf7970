//! Blob storage for product images.
//!
//! The asset lifecycle only needs three things from object storage: store
//! bytes under a name, turn a name into a public URL, and delete a name.
//! [`BlobStore`] captures exactly that so production backends and test
//! doubles are interchangeable behind an `Arc<dyn BlobStore>`.

mod local;
mod memory;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;

use crate::errors::Result;
use async_trait::async_trait;
use std::path::Path;
use ulid::Ulid;

/// Result of deleting a blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The blob existed and was removed
    Deleted,
    /// There was nothing stored under that name
    NotFound,
}

/// Object storage keyed by blob name.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under `name`, replacing any existing blob, and returns its URL.
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<String>;

    /// Public URL a blob named `name` is (or would be) served from.
    fn url_for(&self, name: &str) -> String;

    /// Removes the blob named `name`.
    async fn delete(&self, name: &str) -> Result<DeleteOutcome>;
}

/// Builds a fresh blob name for an uploaded image.
///
/// Names look like `product_{id}_{ulid}.{ext}` (or `product_{ulid}.{ext}`
/// without a product). The ULID sorts by creation time and is unique across
/// concurrent uploads; the extension is copied from `original_name`.
#[must_use]
pub fn image_blob_name(product_id: Option<i64>, original_name: &str) -> String {
    let unique = Ulid::new().to_string().to_lowercase();
    let stem = product_id.map_or_else(
        || format!("product_{unique}"),
        |id| format!("product_{id}_{unique}"),
    );

    match file_extension(original_name) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

/// Extracts the blob name from a stored image reference (the last path
/// segment of the URL, without query string or fragment).
#[must_use]
pub fn blob_name_from_ref(reference: &str) -> Option<&str> {
    let without_query = reference
        .split(['?', '#'])
        .next()
        .unwrap_or(reference);
    without_query
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
}

fn file_extension(original_name: &str) -> Option<String> {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
}

/// Blob names must be a single path segment.
pub(crate) fn is_valid_blob_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}
