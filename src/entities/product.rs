//! Product entity - Represents a sellable catalog item.
//!
//! Each product has a name, a cost and a price (stored as integer cents),
//! an optional image reference pointing into the blob store, and a status.
//! Products are never removed; deletion flips the status to `deleted` so that
//! historical order lines keep a valid reference.

use crate::money;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a product
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    /// Listed and orderable
    #[sea_orm(string_value = "active")]
    Active,
    /// Soft-deleted; hidden from listings and carts
    #[sea_orm(string_value = "deleted")]
    Deleted,
}

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name of the product
    pub name: String,
    /// Purchase cost in cents
    pub cost_cents: i64,
    /// Selling price in cents
    pub price_cents: i64,
    /// URL of the product image in the blob store, if any
    pub image: Option<String>,
    /// Active or soft-deleted
    pub status: ProductStatus,
    /// When the product was created
    pub created_at: DateTime,
    /// When the product was last modified
    pub updated_at: DateTime,
}

impl Model {
    /// Purchase cost as a two-decimal amount.
    #[must_use]
    pub fn cost(&self) -> Decimal {
        money::from_cents(self.cost_cents)
    }

    /// Selling price as a two-decimal amount.
    #[must_use]
    pub fn price(&self) -> Decimal {
        money::from_cents(self.price_cents)
    }

    /// Whether the product is visible and orderable.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product appears on many order lines
    #[sea_orm(has_many = "super::order_line::Entity")]
    OrderLines,
}

impl Related<super::order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
