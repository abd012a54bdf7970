//! Unified error types for the storefront backend.
//!
//! Every fallible operation returns [`Result`]. Variants are grouped the way
//! callers need to react to them: rejected input, dangling references,
//! status machine misuse, blob storage failures and database failures.

use crate::entities::order::OrderStatus;
use sea_orm::DbErr;
use thiserror::Error;

/// Errors produced by catalog, order, revenue and asset operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed input, rejected before any store is touched
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// A cart referenced a product that does not exist or has been deleted
    #[error("Product {product_id} does not exist or has been deleted")]
    UnknownProduct {
        /// The id that could not be resolved
        product_id: i64,
    },

    /// The order status machine rejected a transition
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Order being transitioned
        order_id: i64,
        /// Status the order is currently in
        from: OrderStatus,
        /// Requested status
        to: OrderStatus,
    },

    /// Product lookup by id found nothing (or a soft-deleted row)
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// Product id
        id: i64,
    },

    /// Order lookup by id found nothing
    #[error("Order not found: {id}")]
    OrderNotFound {
        /// Order id
        id: i64,
    },

    /// Blob store failure
    #[error("Storage error: {message}")]
    Storage {
        /// Underlying failure description
        message: String,
    },

    /// Relational store failure
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Local I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required environment variable missing or malformed
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::Storage`] with the given message.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
