//! Product business logic - Handles all catalog operations.
//!
//! This module provides functions for creating, retrieving, updating and
//! soft-deleting products, plus the explicit insert-or-update used by the
//! catalog import. Prices are validated and converted to cents here so that
//! nothing below this layer ever sees a malformed amount.

use crate::{
    entities::{Product, ProductStatus, product},
    errors::{Error, Result},
    money,
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Editable product fields, as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    /// Display name
    pub name: String,
    /// Purchase cost, at most two decimal places
    pub cost: Decimal,
    /// Selling price, at most two decimal places
    pub price: Decimal,
}

impl ProductDraft {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, cost: Decimal, price: Decimal) -> Self {
        Self {
            name: name.into(),
            cost,
            price,
        }
    }

    /// Validates the draft, returning the trimmed name and amounts in cents.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if the name is blank or an amount is
    /// negative or has more than two decimal places.
    pub fn validate(&self) -> Result<ValidDraft> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::validation("Product name cannot be empty"));
        }

        Ok(ValidDraft {
            name: name.to_string(),
            cost_cents: money::to_cents(self.cost)?,
            price_cents: money::to_cents(self.price)?,
        })
    }
}

/// A [`ProductDraft`] that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft {
    name: String,
    cost_cents: i64,
    price_cents: i64,
}

/// Whether an upsert created a new row or updated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    /// A new product row was inserted
    Created,
    /// An existing active product was updated
    Updated,
}

/// Retrieves all active products, newest first.
pub async fn list_active_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::Status.eq(ProductStatus::Active))
        .order_by_desc(product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a product by id regardless of status.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves an active product by id.
///
/// # Errors
/// Returns [`Error::ProductNotFound`] if the product does not exist or has
/// been deleted.
pub async fn get_active_product<C>(db: &C, product_id: i64) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    get_product_by_id(db, product_id)
        .await?
        .filter(product::Model::is_active)
        .ok_or(Error::ProductNotFound { id: product_id })
}

/// Finds an active product by exact (trimmed) name.
pub async fn find_active_product_by_name<C>(db: &C, name: &str) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find()
        .filter(product::Column::Name.eq(name.trim()))
        .filter(product::Column::Status.eq(ProductStatus::Active))
        .order_by_asc(product::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new active product.
///
/// # Errors
/// Returns an error if the draft is invalid or the insert fails.
#[instrument(skip(db))]
pub async fn create_product<C>(
    db: &C,
    draft: &ProductDraft,
    image: Option<String>,
) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let valid = draft.validate()?;
    insert_valid(db, valid, image).await
}

async fn insert_valid<C>(db: &C, valid: ValidDraft, image: Option<String>) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now().naive_utc();

    let product = product::ActiveModel {
        name: Set(valid.name),
        cost_cents: Set(valid.cost_cents),
        price_cents: Set(valid.price_cents),
        image: Set(image),
        status: Set(ProductStatus::Active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let product = product.insert(db).await?;
    info!(product_id = product.id, "Created product");
    Ok(product)
}

/// Updates an active product's name, cost and price.
///
/// Order lines already committed keep their own copies of cost and price and
/// are not affected.
///
/// # Errors
/// Returns an error if:
/// - The draft is invalid
/// - The product does not exist or is deleted
/// - The database update fails
#[instrument(skip(db))]
pub async fn update_product<C>(db: &C, product_id: i64, draft: &ProductDraft) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let valid = draft.validate()?;
    let existing = get_active_product(db, product_id).await?;
    update_valid(db, existing, valid, None).await
}

/// Applies a validated draft (and optionally a new image reference) to `existing`.
pub(crate) async fn update_valid<C>(
    db: &C,
    existing: product::Model,
    valid: ValidDraft,
    image: Option<Option<String>>,
) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let mut product: product::ActiveModel = existing.into();
    product.name = Set(valid.name);
    product.cost_cents = Set(valid.cost_cents);
    product.price_cents = Set(valid.price_cents);
    if let Some(image) = image {
        product.image = Set(image);
    }
    product.updated_at = Set(chrono::Utc::now().naive_utc());

    product.update(db).await.map_err(Into::into)
}

/// Soft deletes a product by flipping its status, preserving order history.
///
/// The product's image blob is left in place.
///
/// # Errors
/// Returns an error if:
/// - The product does not exist or is already deleted
/// - The database update fails
#[instrument(skip(db))]
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    let mut product: product::ActiveModel = get_active_product(db, product_id).await?.into();

    product.status = Set(ProductStatus::Deleted);
    product.updated_at = Set(chrono::Utc::now().naive_utc());

    let product = product.update(db).await?;
    info!(product_id, "Soft-deleted product");
    Ok(product)
}

/// Points an active product at a new image reference.
///
/// # Errors
/// Returns [`Error::ProductNotFound`] if the product does not exist or is
/// deleted, or a database error if the update fails.
pub async fn set_product_image<C>(
    db: &C,
    product_id: i64,
    image: Option<String>,
) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let mut product: product::ActiveModel = get_active_product(db, product_id).await?.into();

    product.image = Set(image);
    product.updated_at = Set(chrono::Utc::now().naive_utc());

    product.update(db).await.map_err(Into::into)
}

/// Inserts a product, or updates the active product with the same name.
///
/// The existence check and the write are two explicit steps; callers that
/// need them to be atomic pass a transaction as `db`. An `image` of `None`
/// leaves an existing product's image untouched.
///
/// # Errors
/// Returns an error if the draft is invalid or a database call fails.
pub async fn upsert_product_by_name<C>(
    db: &C,
    draft: &ProductDraft,
    image: Option<String>,
) -> Result<(product::Model, UpsertOutcome)>
where
    C: ConnectionTrait,
{
    let valid = draft.validate()?;

    match find_active_product_by_name(db, &valid.name).await? {
        Some(existing) => {
            debug!(product_id = existing.id, "Updating product by name");
            let image = image.map(Some);
            let product = update_valid(db, existing, valid, image).await?;
            Ok((product, UpsertOutcome::Updated))
        }
        None => {
            let product = insert_valid(db, valid, image).await?;
            Ok((product, UpsertOutcome::Created))
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_product_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        // Test empty name validation
        let result = create_product(&db, &ProductDraft::new("", dollars(1), dollars(2)), None).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // Test whitespace-only name validation
        let result =
            create_product(&db, &ProductDraft::new("   ", dollars(1), dollars(2)), None).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // Test negative price validation
        let draft = ProductDraft::new("Mug", dollars(1), Decimal::new(-500, 2));
        let result = create_product(&db, &draft, None).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // Test sub-cent price validation
        let draft = ProductDraft::new("Mug", Decimal::new(1005, 3), dollars(2));
        let result = create_product(&db, &draft, None).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let draft = ProductDraft::new("  Teddy Bear ", Decimal::new(1000, 2), Decimal::new(1500, 2));
        let product = create_product(&db, &draft, Some("http://x/a.png".to_string())).await?;

        assert_eq!(product.name, "Teddy Bear");
        assert_eq!(product.cost_cents, 1000);
        assert_eq!(product.price_cents, 1500);
        assert_eq!(product.price(), Decimal::new(15, 0));
        assert_eq!(product.image.as_deref(), Some("http://x/a.png"));
        assert!(product.is_active());

        Ok(())
    }

    #[tokio::test]
    async fn test_list_active_products_newest_first_excludes_deleted() -> Result<()> {
        let db = setup_test_db().await?;

        let first = create_test_product(&db, "First").await?;
        let second = create_test_product(&db, "Second").await?;
        let removed = create_test_product(&db, "Removed").await?;
        delete_product(&db, removed.id).await?;

        let products = list_active_products(&db).await?;
        assert_eq!(products, vec![second, first]);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Original").await?;

        let draft = ProductDraft::new("Renamed", Decimal::new(450, 2), Decimal::new(800, 2));
        let updated = update_product(&db, product.id, &draft).await?;

        assert_eq!(updated.id, product.id);
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.cost(), Decimal::new(450, 2));
        assert_eq!(updated.price(), Decimal::new(800, 2));

        let retrieved = get_product_by_id(&db, product.id).await?.unwrap();
        assert_eq!(retrieved, updated);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_deleted_product_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Gone").await?;
        delete_product(&db, product.id).await?;

        let draft = ProductDraft::new("Back", dollars(1), dollars(2));
        let result = update_product(&db, product.id, &draft).await;
        assert!(matches!(result, Err(Error::ProductNotFound { id }) if id == product.id));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_product_is_soft() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Soft").await?;

        let deleted = delete_product(&db, product.id).await?;
        assert_eq!(deleted.status, ProductStatus::Deleted);

        // Row still exists
        let row = get_product_by_id(&db, product.id).await?.unwrap();
        assert_eq!(row.status, ProductStatus::Deleted);

        // Second delete reports not found
        let result = delete_product(&db, product.id).await;
        assert!(matches!(result, Err(Error::ProductNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_product_not_found() -> Result<()> {
        let db = setup_test_db().await?;

        let result = delete_product(&db, 999).await;
        assert!(matches!(result, Err(Error::ProductNotFound { id: 999 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_product_image() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Pictured").await?;

        let updated = set_product_image(&db, product.id, Some("http://x/new.png".to_string())).await?;
        assert_eq!(updated.image.as_deref(), Some("http://x/new.png"));

        let result = set_product_image(&db, 999, None).await;
        assert!(matches!(result, Err(Error::ProductNotFound { id: 999 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_product_by_name() -> Result<()> {
        let db = setup_test_db().await?;

        let draft = ProductDraft::new("Kite", dollars(3), dollars(5));
        let (created, outcome) =
            upsert_product_by_name(&db, &draft, Some("http://x/kite.png".to_string())).await?;
        assert_eq!(outcome, UpsertOutcome::Created);

        let draft = ProductDraft::new("Kite", dollars(4), dollars(6));
        let (updated, outcome) = upsert_product_by_name(&db, &draft, None).await?;
        assert_eq!(outcome, UpsertOutcome::Updated);
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.price(), dollars(6));
        // No new image supplied, existing one kept
        assert_eq!(updated.image.as_deref(), Some("http://x/kite.png"));

        assert_eq!(list_active_products(&db).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_ignores_deleted_namesake() -> Result<()> {
        let db = setup_test_db().await?;
        let old = create_test_product(&db, "Yo-yo").await?;
        delete_product(&db, old.id).await?;

        let draft = ProductDraft::new("Yo-yo", dollars(1), dollars(2));
        let (product, outcome) = upsert_product_by_name(&db, &draft, None).await?;
        assert_eq!(outcome, UpsertOutcome::Created);
        assert_ne!(product.id, old.id);

        Ok(())
    }
}
