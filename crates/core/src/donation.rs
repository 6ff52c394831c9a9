//! Donation ledger arithmetic.
//!
//! A share of each order total is added to a running donation total kept in
//! a Shopify metafield; cancelled orders take their share back out. The
//! stored total never drops below zero and is kept at two decimal places.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while reading an order total from a webhook body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// The field is absent or `null`.
    #[error("missing orderTotal")]
    Missing,
    /// The value is not a number or numeric string.
    #[error("invalid orderTotal: {0}")]
    Invalid(String),
    /// The value is negative.
    #[error("orderTotal must not be negative")]
    Negative,
    /// The arithmetic result does not fit in a `Decimal`.
    #[error("donation total out of range")]
    Overflow,
}

/// Parse an order total sent either as a JSON number or a numeric string.
///
/// # Errors
///
/// Returns [`AmountError`] when the value is missing, not numeric, or
/// negative.
pub fn parse_order_total(value: Option<&Value>) -> Result<Decimal, AmountError> {
    let amount = match value {
        None | Some(Value::Null) => return Err(AmountError::Missing),
        Some(Value::Number(n)) => {
            Decimal::from_str(&n.to_string()).or_else(|_| Decimal::from_scientific(&n.to_string()))
        }
        Some(Value::String(s)) => Decimal::from_str(s.trim()),
        Some(other) => return Err(AmountError::Invalid(other.to_string())),
    }
    .map_err(|e| AmountError::Invalid(e.to_string()))?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AmountError::Negative);
    }

    Ok(amount)
}

/// Read a stored total; anything unparsable counts as zero.
#[must_use]
pub fn parse_stored_total(value: Option<&str>) -> Decimal {
    value
        .and_then(|v| Decimal::from_str(v.trim()).ok())
        .unwrap_or(Decimal::ZERO)
}

/// The donation share of an order total.
///
/// # Errors
///
/// Returns [`AmountError::Overflow`] when the product is out of range.
pub fn donation_for(order_total: Decimal, rate: Decimal) -> Result<Decimal, AmountError> {
    order_total.checked_mul(rate).ok_or(AmountError::Overflow)
}

/// Apply a signed change to the running total.
///
/// The result is rounded half-away-from-zero to cents and clamped at zero.
///
/// # Errors
///
/// Returns [`AmountError::Overflow`] when the sum is out of range.
pub fn apply_delta(current: Decimal, delta: Decimal) -> Result<Decimal, AmountError> {
    let total = current
        .checked_add(delta)
        .ok_or(AmountError::Overflow)?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    Ok(total.max(Decimal::ZERO))
}

/// Render a total the way the `number_decimal` metafield stores it.
#[must_use]
pub fn format_total(total: Decimal) -> String {
    format!("{total:.2}")
}
