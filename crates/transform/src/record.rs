//! Validation and field derivation for one transaction.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use ecom_core::{EnrichedTransaction, RawTransaction};

use crate::error::TransformError;
use crate::parquet::builders::to_scaled_i128;
use crate::parquet::schema;

/// Monetary results are rounded to cents, half away from zero.
pub const AMOUNT_SCALE: u32 = 2;

const AMOUNT_ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

/// Reject values the output column cannot hold, so they fail here as input
/// errors instead of later during encoding.
fn check_column_fits(
    field: &'static str,
    scale: i8,
    value: Decimal,
) -> Result<(), TransformError> {
    to_scaled_i128(field, scale, value)
        .map(|_| ())
        .map_err(|e| TransformError::validation(field, e.to_string()))
}

/// Zone-less ISO-8601 layouts, tried in order. `%.f` also matches an
/// absent fraction.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse an ISO-8601 timestamp into a wall-clock instant.
///
/// Supports:
/// 1. `2024-03-15T14:30:00` / `2024-03-15T14:30:00.123456`
/// 2. Space-separated: `2024-03-15 14:30:00`
/// 3. RFC 3339 with offset: `2024-03-15T14:30:00+02:00`; the wall clock of
///    the stated offset is kept, nothing is converted to UTC
/// 4. Date only: `2024-03-15` (midnight)
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, TransformError> {
    let trimmed = value.trim();

    for format in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(ts);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local());
    }
    if let Some(ts) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(ts);
    }

    Err(TransformError::malformed(
        "timestamp",
        format!("'{value}' is not an ISO-8601 timestamp"),
    ))
}

/// Validate a raw transaction and derive its calendar and monetary fields.
///
/// The timestamp is parsed before quantity and price are checked, so a bad
/// timestamp is always reported as [`TransformError::MalformedInput`] even
/// when the amounts are invalid too. Any `total_amount` on the input is
/// replaced by `round(quantity * price, 2)`.
pub fn transform(raw: &RawTransaction) -> Result<EnrichedTransaction, TransformError> {
    let timestamp = parse_timestamp(&raw.timestamp)?;

    if raw.quantity <= 0 {
        return Err(TransformError::validation(
            "quantity",
            format!("must be greater than 0, got {}", raw.quantity),
        ));
    }
    if raw.price <= Decimal::ZERO {
        return Err(TransformError::validation(
            "price",
            format!("must be greater than 0, got {}", raw.price),
        ));
    }

    check_column_fits("price", schema::PRICE_SCALE, raw.price)?;

    let total_amount = Decimal::from(raw.quantity)
        .checked_mul(raw.price)
        .ok_or_else(|| {
            TransformError::validation("total_amount", "quantity * price overflows a decimal")
        })?
        .round_dp_with_strategy(AMOUNT_SCALE, AMOUNT_ROUNDING);
    check_column_fits("total_amount", schema::AMOUNT_SCALE, total_amount)?;

    if let Some(supplied) = raw.total_amount {
        if supplied != total_amount {
            debug!(
                transaction_id = %raw.transaction_id,
                supplied = %supplied,
                computed = %total_amount,
                "overwriting inconsistent total_amount"
            );
        }
    }

    // No discount rules exist yet.
    let discount = Decimal::new(0, AMOUNT_SCALE);
    let final_amount = total_amount - discount;

    Ok(EnrichedTransaction {
        transaction_id: raw.transaction_id.clone(),
        timestamp,
        customer_id: raw.customer_id.clone(),
        product_id: raw.product_id.clone(),
        quantity: raw.quantity,
        price: raw.price,
        category: raw.category.clone(),
        total_amount,
        year: timestamp.year(),
        month: timestamp.month(),
        day: timestamp.day(),
        hour: timestamp.hour(),
        day_of_week: timestamp.weekday().num_days_from_monday(),
        discount,
        final_amount,
    })
}
