//! Database configuration module for the storefront backend.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust models.

use crate::entities::{Order, OrderLine, Product};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info, instrument};

const DEFAULT_DATABASE_URL: &str = "sqlite://storefront.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable or returns
/// the default local `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection pool using the `DATABASE_URL` environment variable.
pub async fn create_connection() -> Result<DatabaseConnection> {
    connect(&get_database_url()).await
}

/// Establishes a connection pool to the given database URL.
#[instrument]
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Opening database connection pool");
    let db = Database::connect(database_url).await?;
    info!("Database connection pool opened");
    Ok(db)
}

/// Creates the products, orders and order lines tables if they do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    create_table(db, Product).await?;
    create_table(db, Order).await?;
    create_table(db, OrderLine).await?;
    info!("Database tables ensured");
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}
