//! Order line entity - One product sold on an order.
//!
//! Cost and price are copied from the product when the order is committed and
//! never read back from the product afterwards.

use crate::money;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order line database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_lines")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning order
    pub order_id: i64,
    /// Product that was sold
    pub product_id: i64,
    /// Product cost in cents at the time of sale
    pub cost_cents: i64,
    /// Product price in cents at the time of sale
    pub price_cents: i64,
}

impl Model {
    /// Snapshotted cost as a two-decimal amount.
    #[must_use]
    pub fn cost(&self) -> Decimal {
        money::from_cents(self.cost_cents)
    }

    /// Snapshotted price as a two-decimal amount.
    #[must_use]
    pub fn price(&self) -> Decimal {
        money::from_cents(self.price_cents)
    }
}

/// Defines relationships between `OrderLine` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    /// Each line refers to one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
