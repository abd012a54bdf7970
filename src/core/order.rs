//! Order business logic - Commits sales and reads them back.
//!
//! Committing an order writes the header and one line per cart entry inside a
//! single database transaction. Each line copies the product's cost and price
//! as read inside that transaction, so later catalog edits never rewrite
//! history. If any cart entry cannot be resolved the transaction is dropped
//! and nothing becomes visible.

use crate::{
    entities::{Order, OrderLine, OrderStatus, Product, order, order_line, product},
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Who is buying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer name; must not be blank
    pub name: String,
    /// Contact phone number
    pub phone: String,
    /// Delivery address
    pub address: String,
}

/// One cart entry. Each entry becomes one order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product being bought
    pub product_id: i64,
}

/// Everything needed to commit an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    /// Buyer details
    pub customer: Customer,
    /// Date of payment
    pub pay_date: NaiveDate,
    /// Time of payment
    pub pay_time: NaiveTime,
    /// Products bought, one entry per unit
    pub cart: Vec<CartItem>,
}

/// An order header together with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommittedOrder {
    /// The order header
    pub order: order::Model,
    /// Lines in insertion order
    pub lines: Vec<order_line::Model>,
}

/// An order line joined with the name of its product, for bill display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLineView {
    /// The stored line
    pub line: order_line::Model,
    /// Current name of the product, if the product row still exists
    pub product_name: Option<String>,
}

impl NewOrder {
    fn validate(&self) -> Result<()> {
        if self.customer.name.trim().is_empty() {
            return Err(Error::validation("Customer name cannot be empty"));
        }
        if self.cart.is_empty() {
            return Err(Error::validation("Cart cannot be empty"));
        }
        Ok(())
    }
}

/// Commits an order: header plus one snapshotted line per cart entry.
///
/// All writes happen in one transaction. On success the returned order has
/// exactly `cart.len()` lines and status `pending`.
///
/// # Errors
/// Returns an error if:
/// - The customer name is blank or the cart is empty (nothing is written)
/// - A cart entry names a product that does not exist or is deleted
///   ([`Error::UnknownProduct`]; the whole order is rolled back)
/// - Any database call fails (the whole order is rolled back)
#[instrument(skip(db, new_order), fields(cart_len = new_order.cart.len()))]
pub async fn commit_order(db: &DatabaseConnection, new_order: NewOrder) -> Result<CommittedOrder> {
    new_order.validate()?;

    // Dropping `txn` on any early return rolls everything back
    let txn = db.begin().await?;

    let header = order::ActiveModel {
        customer_name: Set(new_order.customer.name.trim().to_string()),
        customer_phone: Set(new_order.customer.phone),
        customer_address: Set(new_order.customer.address),
        pay_date: Set(new_order.pay_date),
        pay_time: Set(new_order.pay_time),
        status: Set(OrderStatus::Pending),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    debug!(order_id = header.id, "Inserted order header");

    let mut lines = Vec::with_capacity(new_order.cart.len());
    for item in &new_order.cart {
        let product = Product::find_by_id(item.product_id)
            .one(&txn)
            .await?
            .filter(product::Model::is_active)
            .ok_or(Error::UnknownProduct {
                product_id: item.product_id,
            })?;

        let line = order_line::ActiveModel {
            order_id: Set(header.id),
            product_id: Set(product.id),
            cost_cents: Set(product.cost_cents),
            price_cents: Set(product.price_cents),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        lines.push(line);
    }

    txn.commit().await?;
    info!(order_id = header.id, lines = lines.len(), "Committed order");

    Ok(CommittedOrder {
        order: header,
        lines,
    })
}

/// Lists all order headers, newest first.
pub async fn list_orders(db: &DatabaseConnection) -> Result<Vec<order::Model>> {
    Order::find()
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves an order header by id.
///
/// # Errors
/// Returns [`Error::OrderNotFound`] if no such order exists.
pub async fn get_order<C>(db: &C, order_id: i64) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })
}

/// Retrieves an order header with all of its lines in insertion order.
///
/// # Errors
/// Returns [`Error::OrderNotFound`] if no such order exists.
pub async fn load_order(db: &DatabaseConnection, order_id: i64) -> Result<CommittedOrder> {
    let order = get_order(db, order_id).await?;
    let lines = OrderLine::find()
        .filter(order_line::Column::OrderId.eq(order_id))
        .order_by_asc(order_line::Column::Id)
        .all(db)
        .await?;

    Ok(CommittedOrder { order, lines })
}

/// Bill details: every line of an order with its product name, newest line first.
///
/// # Errors
/// Returns [`Error::OrderNotFound`] if no such order exists.
pub async fn order_lines_with_products(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Vec<OrderLineView>> {
    get_order(db, order_id).await?;

    let rows = OrderLine::find()
        .filter(order_line::Column::OrderId.eq(order_id))
        .find_also_related(Product)
        .order_by_desc(order_line::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(line, product)| OrderLineView {
            line,
            product_name: product.map(|p| p.name),
        })
        .collect())
}
