//! Fixed-point money handling.
//!
//! Amounts travel through the API as [`Decimal`] values with at most two
//! fractional digits and are persisted as whole cents in `i64` columns, so
//! sums never pick up binary floating-point error.

use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Converts a stored cent count back to a two-decimal amount.
#[must_use]
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Converts an amount to whole cents.
///
/// # Errors
/// Returns [`Error::Validation`] if the amount is negative, has more than two
/// fractional digits, or does not fit in an `i64` cent count.
pub fn to_cents(amount: Decimal) -> Result<i64> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::validation(format!(
            "Amount cannot be negative: {amount}"
        )));
    }

    if amount.normalize().scale() > 2 {
        return Err(Error::validation(format!(
            "Amount has more than two decimal places: {amount}"
        )));
    }

    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.trunc().to_i64())
        .ok_or_else(|| Error::validation(format!("Amount is out of range: {amount}")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_to_cents_accepts_two_decimal_places() {
        assert_eq!(to_cents(Decimal::new(1500, 2)).unwrap(), 1500);
        assert_eq!(to_cents(Decimal::new(45, 1)).unwrap(), 450);
        assert_eq!(to_cents(Decimal::new(8, 0)).unwrap(), 800);
        assert_eq!(to_cents(Decimal::ZERO).unwrap(), 0);
    }

    #[test]
    fn test_to_cents_ignores_trailing_zeros() {
        // 1.2300 carries scale 4 but only two significant fractional digits
        assert_eq!(to_cents(Decimal::new(12300, 4)).unwrap(), 123);
    }

    #[test]
    fn test_to_cents_rejects_fractional_cents() {
        let result = to_cents(Decimal::new(1001, 3));
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[test]
    fn test_to_cents_rejects_negative_amounts() {
        let result = to_cents(Decimal::new(-100, 2));
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[test]
    fn test_from_cents_keeps_two_places() {
        let amount = from_cents(2300);
        assert_eq!(amount, Decimal::new(23, 0));
        assert_eq!(amount.to_string(), "23.00");
    }
}
