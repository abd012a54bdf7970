//! Revenue dashboard business logic
//!
//! Sums the snapshotted line prices of every order paid within a calendar
//! year into twelve month buckets. Sums are computed in integer cents and
//! only converted to [`Decimal`] at the end, so no rounding error can build
//! up. Months without sales report zero; the result always has twelve
//! entries in month order.

use crate::{
    config::settings::RevenueConfig,
    entities::{Order, OrderLine, OrderStatus, order, order_line},
    errors::{Error, Result},
    money,
};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::{QuerySelect, prelude::*};
use serde::Serialize;
use tracing::{debug, instrument};

/// Which orders count towards revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RevenueScope {
    /// Every order regardless of status
    #[default]
    AllOrders,
    /// Every order except cancelled ones
    ExcludeCancelled,
}

impl RevenueScope {
    /// Scope selected by the `[revenue]` settings.
    #[must_use]
    pub const fn from_config(config: &RevenueConfig) -> Self {
        if config.exclude_cancelled {
            Self::ExcludeCancelled
        } else {
            Self::AllOrders
        }
    }
}

/// Revenue for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyRevenue {
    /// Month number, 1 to 12
    pub month: u32,
    /// Sum of line prices for orders paid in that month
    pub sum: Decimal,
}

/// Monthly revenue for `year`, counting orders of every status.
///
/// # Errors
/// Returns an error if the year is out of range or the query fails.
pub async fn monthly_revenue(db: &DatabaseConnection, year: i32) -> Result<Vec<MonthlyRevenue>> {
    monthly_revenue_scoped(db, year, RevenueScope::AllOrders).await
}

/// Monthly revenue for `year`, restricted to the orders `scope` selects.
///
/// # Errors
/// Returns an error if the year is out of range or the query fails.
#[instrument(skip(db))]
pub async fn monthly_revenue_scoped(
    db: &DatabaseConnection,
    year: i32,
    scope: RevenueScope,
) -> Result<Vec<MonthlyRevenue>> {
    let (start, _) = month_range(year, 1)?;
    let (_, end) = month_range(year, 12)?;

    let mut query = OrderLine::find()
        .select_only()
        .column(order::Column::PayDate)
        .column(order_line::Column::PriceCents)
        .inner_join(Order)
        .filter(order::Column::PayDate.between(start, end));

    if scope == RevenueScope::ExcludeCancelled {
        query = query.filter(order::Column::Status.ne(OrderStatus::Cancelled));
    }

    let rows: Vec<(NaiveDate, i64)> = query.into_tuple().all(db).await?;
    debug!(lines = rows.len(), "Loaded order lines for revenue");

    Ok(bucket_by_month(year, rows))
}

/// First and last day (inclusive) of `month` in `year`.
///
/// # Errors
/// Returns [`Error::Validation`] if the month is not 1 to 12 or the year is
/// outside the supported calendar range.
pub fn month_range(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let invalid = || Error::validation(format!("Invalid year/month: {year}-{month}"));

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    let last = next_first.pred_opt().ok_or_else(invalid)?;

    Ok((first, last))
}

/// Buckets `(pay_date, price_cents)` pairs into twelve months of `year`.
///
/// Pairs dated outside `year` are ignored.
pub fn bucket_by_month<I>(year: i32, rows: I) -> Vec<MonthlyRevenue>
where
    I: IntoIterator<Item = (NaiveDate, i64)>,
{
    let mut cents = [0_i64; 12];
    for (pay_date, price_cents) in rows {
        if pay_date.year() == year {
            cents[pay_date.month0() as usize] += price_cents;
        }
    }

    (1..=12)
        .zip(cents)
        .map(|(month, total)| MonthlyRevenue {
            month,
            sum: money::from_cents(total),
        })
        .collect()
}

/// Formats a year of monthly revenue into a human-readable summary string.
#[must_use]
pub fn format_revenue_summary(year: i32, months: &[MonthlyRevenue]) -> String {
    let total: Decimal = months.iter().map(|m| m.sum).sum();
    let mut summary = format!("Revenue {year} - total ${total:.2}\n");

    for entry in months {
        let label = NaiveDate::from_ymd_opt(year, entry.month, 1)
            .map_or_else(|| entry.month.to_string(), |d| d.format("%B").to_string());
        summary.push_str(&format!("  {label:<10} ${:.2}\n", entry.sum));
    }

    summary
}
