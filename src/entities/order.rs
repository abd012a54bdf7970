//! Order entity - The header of a sale.
//!
//! An order records who bought, when they paid and where the order is in its
//! fulfilment lifecycle. The purchased items live in `order_lines`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fulfilment status of an order
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Committed, awaiting payment
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Payment received
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Handed over for delivery
    #[sea_orm(string_value = "shipped")]
    Shipped,
    /// Abandoned before shipping
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    /// Lower-case name as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Shipped => "shipped",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order header database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the buying customer
    pub customer_name: String,
    /// Contact phone number
    pub customer_phone: String,
    /// Delivery address
    pub customer_address: String,
    /// Date the customer paid; drives revenue bucketing
    pub pay_date: Date,
    /// Time of day the customer paid
    pub pay_time: Time,
    /// Current fulfilment status
    pub status: OrderStatus,
    /// When the order was committed
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One order owns many lines
    #[sea_orm(has_many = "super::order_line::Entity")]
    OrderLines,
}

impl Related<super::order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
