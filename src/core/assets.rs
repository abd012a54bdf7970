//! Product image lifecycle.
//!
//! Swapping a product image touches two stores with no transaction spanning
//! them, so the steps are ordered to keep the database reference valid at
//! every point:
//!
//! 1. upload the new blob (on failure nothing else happens)
//! 2. point the product row at the new blob (on failure the new blob is
//!    discarded and the row still points at the old one)
//! 3. delete the old blob (on failure the old blob is reported as orphaned;
//!    the new reference stays)
//!
//! Only blobs whose URL this store would hand out are ever deleted; a
//! reference pointing elsewhere may still be in use by another product.
//!
//! The manager never looks at file contents; it only names and moves bytes.

use crate::{
    core::product::{self, ProductDraft, ValidDraft},
    entities::product as product_entity,
    errors::Result,
    storage::{BlobStore, DeleteOutcome, blob_name_from_ref, image_blob_name},
};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// An uploaded image file as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Original client-side file name; only its extension is kept
    pub file_name: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Convenience constructor.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// A blob that was written to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredImage {
    /// Blob name inside the store
    pub name: String,
    /// Public URL, as saved on the product
    pub url: String,
}

/// An old blob that could not be deleted after its replacement went live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanedAsset {
    /// The stale image reference
    pub reference: String,
    /// Why cleanup failed
    pub reason: String,
}

/// Result of replacing a product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageReplacement {
    /// The product after the swap
    pub product: product_entity::Model,
    /// The newly stored image
    pub image: StoredImage,
    /// Reference the product held before the swap
    pub previous: Option<String>,
    /// Set when the previous blob could not be removed
    pub orphaned: Option<OrphanedAsset>,
}

/// Result of updating a product's details, possibly with a new image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductUpdate {
    /// The product after the update
    pub product: product_entity::Model,
    /// Set when a replaced image blob could not be removed
    pub orphaned: Option<OrphanedAsset>,
}

/// Coordinates product rows and their image blobs.
pub struct AssetManager {
    db: Arc<DatabaseConnection>,
    blobs: Arc<dyn BlobStore>,
}

impl AssetManager {
    /// Creates a manager over a shared database pool and a blob store.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { db, blobs }
    }

    /// The database pool the manager writes product rows through.
    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Stores an image that is not (yet) attached to any product.
    ///
    /// # Errors
    /// Returns [`crate::errors::Error::Storage`] if the upload fails.
    #[instrument(skip(self, upload), fields(file_name = %upload.file_name))]
    pub async fn upload_standalone_image(&self, upload: &ImageUpload) -> Result<StoredImage> {
        self.store(None, upload).await
    }

    /// Replaces the image of an active product.
    ///
    /// The current reference is re-read and swapped inside one transaction,
    /// so `previous` is always the reference this call actually replaced.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The product does not exist or is deleted (nothing is uploaded)
    /// - The upload fails (the product row is untouched)
    /// - Saving the new reference fails (the new blob is discarded, the row
    ///   keeps its old reference)
    ///
    /// Failing to delete the old blob is not an error; it is reported in
    /// [`ImageReplacement::orphaned`].
    #[instrument(skip(self, upload), fields(file_name = %upload.file_name))]
    pub async fn replace_product_image(
        &self,
        product_id: i64,
        upload: &ImageUpload,
    ) -> Result<ImageReplacement> {
        product::get_active_product(self.db(), product_id).await?;
        let stored = self.store(Some(product_id), upload).await?;

        let (previous, updated) = match self.swap_image(product_id, &stored.url).await {
            Ok(swapped) => swapped,
            Err(e) => {
                self.discard(&stored).await;
                return Err(e);
            }
        };

        let orphaned = self.retire(previous.as_deref()).await;
        info!(product_id, image = %stored.url, "Replaced product image");

        Ok(ImageReplacement {
            product: updated,
            image: stored,
            previous,
            orphaned,
        })
    }

    /// Creates a product, uploading its image first when one is given.
    ///
    /// # Errors
    /// Returns an error if the draft is invalid (nothing is uploaded), the
    /// upload fails (no row is created), or the insert fails (the uploaded
    /// blob is discarded).
    #[instrument(skip(self, upload))]
    pub async fn create_product_with_image(
        &self,
        draft: &ProductDraft,
        upload: Option<&ImageUpload>,
    ) -> Result<product_entity::Model> {
        draft.validate()?;

        let Some(upload) = upload else {
            return product::create_product(self.db(), draft, None).await;
        };

        let stored = self.store(None, upload).await?;
        match product::create_product(self.db(), draft, Some(stored.url.clone())).await {
            Ok(created) => Ok(created),
            Err(e) => {
                self.discard(&stored).await;
                Err(e)
            }
        }
    }

    /// Updates a product's details and, when an upload is given, its image.
    ///
    /// The image swap follows the same ordering as
    /// [`AssetManager::replace_product_image`], with the detail change and the
    /// new reference saved in one row update.
    ///
    /// # Errors
    /// Returns an error if the draft is invalid, the product does not exist
    /// or is deleted, the upload fails, or the row update fails.
    #[instrument(skip(self, upload))]
    pub async fn update_product_with_image(
        &self,
        product_id: i64,
        draft: &ProductDraft,
        upload: Option<&ImageUpload>,
    ) -> Result<ProductUpdate> {
        let valid = draft.validate()?;
        let existing = product::get_active_product(self.db(), product_id).await?;

        let Some(upload) = upload else {
            let product = product::update_valid(self.db(), existing, valid, None).await?;
            return Ok(ProductUpdate {
                product,
                orphaned: None,
            });
        };

        let stored = self.store(Some(product_id), upload).await?;

        let (previous, product) = match self.swap_details(product_id, valid, &stored.url).await {
            Ok(swapped) => swapped,
            Err(e) => {
                self.discard(&stored).await;
                return Err(e);
            }
        };

        let orphaned = self.retire(previous.as_deref()).await;
        Ok(ProductUpdate { product, orphaned })
    }

    async fn store(&self, product_id: Option<i64>, upload: &ImageUpload) -> Result<StoredImage> {
        let name = image_blob_name(product_id, &upload.file_name);
        let url = self.blobs.put(&name, &upload.bytes).await?;
        Ok(StoredImage { name, url })
    }

    /// Points the product at `url`, returning the reference it replaced.
    async fn swap_image(
        &self,
        product_id: i64,
        url: &str,
    ) -> Result<(Option<String>, product_entity::Model)> {
        let txn = self.db.begin().await?;
        let current = product::get_active_product(&txn, product_id).await?;
        let updated = product::set_product_image(&txn, product_id, Some(url.to_string())).await?;
        txn.commit().await?;
        Ok((current.image, updated))
    }

    /// Applies `valid` and points the product at `url` in one row update,
    /// returning the reference it replaced.
    async fn swap_details(
        &self,
        product_id: i64,
        valid: ValidDraft,
        url: &str,
    ) -> Result<(Option<String>, product_entity::Model)> {
        let txn = self.db.begin().await?;
        let current = product::get_active_product(&txn, product_id).await?;
        let previous = current.image.clone();
        let updated =
            product::update_valid(&txn, current, valid, Some(Some(url.to_string()))).await?;
        txn.commit().await?;
        Ok((previous, updated))
    }

    /// Best-effort removal of a blob that never became referenced.
    async fn discard(&self, stored: &StoredImage) {
        if let Err(e) = self.blobs.delete(&stored.name).await {
            warn!(blob = %stored.name, error = %e, "Failed to discard unreferenced blob");
        }
    }

    /// Blob name behind `reference`, if this store issued it.
    fn owned_blob_name<'a>(&self, reference: &'a str) -> Option<&'a str> {
        blob_name_from_ref(reference).filter(|name| self.blobs.url_for(name) == reference)
    }

    /// Deletes a blob that is no longer referenced, reporting it if that fails.
    ///
    /// References this store did not issue are left alone.
    async fn retire(&self, reference: Option<&str>) -> Option<OrphanedAsset> {
        let reference = reference.filter(|r| !r.trim().is_empty())?;

        let Some(name) = self.owned_blob_name(reference) else {
            debug!(reference, "Previous image is not held by this store, leaving it");
            return None;
        };

        match self.blobs.delete(name).await {
            Ok(DeleteOutcome::Deleted) => None,
            Ok(DeleteOutcome::NotFound) => {
                warn!(blob = name, "Old image blob was already gone");
                None
            }
            Err(e) => {
                warn!(blob = name, error = %e, "Failed to delete old image blob");
                Some(OrphanedAsset {
                    reference: reference.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }
}
