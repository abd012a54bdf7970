//! Core business logic - framework-agnostic catalog, order, revenue and asset operations.

/// Product image upload, replacement and cleanup
pub mod assets;
/// Sequential catalog import of pre-parsed rows
pub mod import;
/// Order commit and order read-side queries
pub mod order;
/// Catalog operations on products
pub mod product;
/// Monthly revenue aggregation for the dashboard
pub mod revenue;
/// Order status transitions
pub mod status;
