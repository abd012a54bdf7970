//! Order status transitions.
//!
//! ```text
//! pending ──► paid ──► shipped
//!    │          │
//!    └──────────┴──► cancelled
//! ```
//!
//! Requesting the status an order already has is a no-op success. Any other
//! move not drawn above is rejected with [`Error::InvalidTransition`].

use crate::{
    entities::{Order, OrderStatus, order},
    errors::{Error, Result},
};
use sea_orm::{TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{debug, info, instrument};

/// Statuses from which `target` may be entered.
#[must_use]
pub const fn allowed_sources(target: OrderStatus) -> &'static [OrderStatus] {
    match target {
        OrderStatus::Pending => &[],
        OrderStatus::Paid => &[OrderStatus::Pending],
        OrderStatus::Shipped => &[OrderStatus::Paid],
        OrderStatus::Cancelled => &[OrderStatus::Pending, OrderStatus::Paid],
    }
}

/// Whether an order in `from` may move to `to`.
#[must_use]
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    allowed_sources(to).contains(&from)
}

/// Moves an order to `target`.
///
/// The write only succeeds if the row is still in the status it was read in,
/// so two racing transitions cannot both apply.
///
/// # Errors
/// Returns an error if:
/// - The order does not exist ([`Error::OrderNotFound`])
/// - The move is not allowed from the order's current status
///   ([`Error::InvalidTransition`])
/// - A database call fails
#[instrument(skip(db))]
pub async fn transition(
    db: &DatabaseConnection,
    order_id: i64,
    target: OrderStatus,
) -> Result<order::Model> {
    let txn = db.begin().await?;

    let current = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;

    if current.status == target {
        debug!(order_id, status = %target, "Order already in requested status");
        return Ok(current);
    }

    if !can_transition(current.status, target) {
        return Err(Error::InvalidTransition {
            order_id,
            from: current.status,
            to: target,
        });
    }

    let result = Order::update_many()
        .col_expr(order::Column::Status, Expr::value(target))
        .filter(order::Column::Id.eq(order_id))
        .filter(order::Column::Status.eq(current.status))
        .exec(&txn)
        .await?;

    if result.rows_affected == 0 {
        // Someone else moved the order between our read and write
        let latest = Order::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or(Error::OrderNotFound { id: order_id })?;
        return Err(Error::InvalidTransition {
            order_id,
            from: latest.status,
            to: target,
        });
    }

    txn.commit().await?;
    info!(order_id, from = %current.status, to = %target, "Order status changed");

    Ok(order::Model {
        status: target,
        ..current
    })
}

/// Marks a pending order as paid.
pub async fn mark_paid(db: &DatabaseConnection, order_id: i64) -> Result<order::Model> {
    transition(db, order_id, OrderStatus::Paid).await
}

/// Marks a paid order as shipped.
pub async fn mark_shipped(db: &DatabaseConnection, order_id: i64) -> Result<order::Model> {
    transition(db, order_id, OrderStatus::Shipped).await
}

/// Cancels a pending or paid order.
pub async fn cancel_order(db: &DatabaseConnection, order_id: i64) -> Result<order::Model> {
    transition(db, order_id, OrderStatus::Cancelled).await
}
