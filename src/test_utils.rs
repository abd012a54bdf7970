//! Shared test utilities for the storefront backend.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        order::{CartItem, Customer, NewOrder},
        product::{self, ProductDraft},
    },
    entities,
    errors::Result,
};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Whole-unit amount, e.g. `dollars(15)` is 15.00.
#[must_use]
pub fn dollars(amount: i64) -> Decimal {
    Decimal::new(amount * 100, 2)
}

/// Creates a test product with sensible defaults.
///
/// # Defaults
/// * cost: 5.00
/// * price: 10.00
/// * image: None
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::product::Model> {
    create_custom_product(db, name, dollars(5), dollars(10)).await
}

/// Creates a test product with custom cost and price.
pub async fn create_custom_product(
    db: &DatabaseConnection,
    name: &str,
    cost: Decimal,
    price: Decimal,
) -> Result<entities::product::Model> {
    product::create_product(db, &ProductDraft::new(name, cost, price), None).await
}

/// Builds an order for `product_ids` paid on 2024-06-15 at noon.
#[must_use]
pub fn new_order(product_ids: &[i64]) -> NewOrder {
    let pay_date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap_or_default();
    new_order_on(pay_date, product_ids)
}

/// Builds an order for `product_ids` paid on `pay_date` at noon.
#[must_use]
pub fn new_order_on(pay_date: NaiveDate, product_ids: &[i64]) -> NewOrder {
    NewOrder {
        customer: Customer {
            name: "Test Customer".to_string(),
            phone: "0800000000".to_string(),
            address: "1 Test Street".to_string(),
        },
        pay_date,
        pay_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default(),
        cart: product_ids
            .iter()
            .map(|&product_id| CartItem { product_id })
            .collect(),
    }
}
