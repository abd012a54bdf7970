//! Bulk catalog import.
//!
//! Takes product rows that were already parsed from a spreadsheet (parsing
//! happens outside this crate) and applies them one at a time, awaiting each
//! write before starting the next. A bad row is recorded and skipped; the
//! summary counts are exact because every write has finished by the time the
//! summary is returned.

use crate::core::product::{ProductDraft, UpsertOutcome, upsert_product_by_name};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// One parsed spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRow {
    /// Row number in the source sheet, for error reporting
    pub row_number: usize,
    /// Product name; rows are matched to existing products by name
    pub name: String,
    /// Purchase cost
    pub cost: Decimal,
    /// Selling price
    pub price: Decimal,
    /// Optional image URL; blank means none
    #[serde(default)]
    pub image: Option<String>,
}

/// A row that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    /// Row number in the source sheet
    pub row_number: usize,
    /// Why the row was rejected
    pub message: String,
}

/// Outcome of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Rows that created a new product
    pub created: usize,
    /// Rows that updated an existing product
    pub updated: usize,
    /// Rows that were rejected
    pub failed: Vec<RowFailure>,
}

impl ImportSummary {
    /// Number of rows written successfully.
    #[must_use]
    pub const fn processed(&self) -> usize {
        self.created + self.updated
    }
}

/// Applies `rows` to the catalog in order.
#[instrument(skip(db, rows), fields(rows = rows.len()))]
pub async fn import_products(db: &DatabaseConnection, rows: Vec<ImportRow>) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for row in rows {
        let draft = ProductDraft::new(row.name, row.cost, row.price);
        let image = row.image.filter(|url| !url.trim().is_empty());

        match upsert_product_by_name(db, &draft, image).await {
            Ok((_, UpsertOutcome::Created)) => summary.created += 1,
            Ok((_, UpsertOutcome::Updated)) => summary.updated += 1,
            Err(e) => {
                warn!(row = row.row_number, error = %e, "Skipping import row");
                summary.failed.push(RowFailure {
                    row_number: row.row_number,
                    message: e.to_string(),
                });
            }
        }
    }

    info!(
        created = summary.created,
        updated = summary.updated,
        failed = summary.failed.len(),
        "Catalog import finished"
    );
    summary
}
