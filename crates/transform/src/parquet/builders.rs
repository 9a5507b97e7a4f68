//! Build typed Arrow arrays from enriched transactions.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, Decimal128Builder, Int32Builder, Int64Builder, StringBuilder,
    TimestampMicrosecondBuilder,
};
use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};

use ecom_core::EnrichedTransaction;

use super::error::ParquetError;
use super::schema::{AMOUNT_SCALE, DECIMAL_PRECISION, PRICE_SCALE};

/// Build one array per schema column, in
/// [`transaction_schema`](super::schema::transaction_schema) order.
pub(crate) fn build_arrays(records: &[EnrichedTransaction]) -> Result<Vec<ArrayRef>, ParquetError> {
    let n = records.len();

    Ok(vec![
        string_column(n, records.iter().map(|r| r.transaction_id.as_str())),
        timestamp_column(n, records.iter().map(|r| r.timestamp)),
        string_column(n, records.iter().map(|r| r.customer_id.as_str())),
        string_column(n, records.iter().map(|r| r.product_id.as_str())),
        int64_column(n, records.iter().map(|r| r.quantity)),
        decimal_column("price", PRICE_SCALE, records.iter().map(|r| r.price))?,
        string_column(n, records.iter().map(|r| r.category.as_str())),
        decimal_column("total_amount", AMOUNT_SCALE, records.iter().map(|r| r.total_amount))?,
        int32_column(n, records.iter().map(|r| r.year)),
        int32_column(n, records.iter().map(|r| r.month as i32)),
        int32_column(n, records.iter().map(|r| r.day as i32)),
        int32_column(n, records.iter().map(|r| r.hour as i32)),
        int32_column(n, records.iter().map(|r| r.day_of_week as i32)),
        decimal_column("discount", AMOUNT_SCALE, records.iter().map(|r| r.discount))?,
        decimal_column("final_amount", AMOUNT_SCALE, records.iter().map(|r| r.final_amount))?,
    ])
}

fn string_column<'a>(n: usize, values: impl Iterator<Item = &'a str>) -> ArrayRef {
    let mut builder = StringBuilder::with_capacity(n, n * 16);
    for v in values {
        builder.append_value(v);
    }
    Arc::new(builder.finish())
}

fn int64_column(n: usize, values: impl Iterator<Item = i64>) -> ArrayRef {
    let mut builder = Int64Builder::with_capacity(n);
    for v in values {
        builder.append_value(v);
    }
    Arc::new(builder.finish())
}

fn int32_column(n: usize, values: impl Iterator<Item = i32>) -> ArrayRef {
    let mut builder = Int32Builder::with_capacity(n);
    for v in values {
        builder.append_value(v);
    }
    Arc::new(builder.finish())
}

/// Microseconds since the epoch of the naive wall clock.
fn timestamp_column(n: usize, values: impl Iterator<Item = NaiveDateTime>) -> ArrayRef {
    let mut builder = TimestampMicrosecondBuilder::with_capacity(n);
    for ts in values {
        builder.append_value(ts.and_utc().timestamp_micros());
    }
    Arc::new(builder.finish())
}

fn decimal_column(
    column: &'static str,
    scale: i8,
    values: impl Iterator<Item = Decimal>,
) -> Result<ArrayRef, ParquetError> {
    let mut builder = Decimal128Builder::new().with_precision_and_scale(DECIMAL_PRECISION, scale)?;
    for v in values {
        builder.append_value(to_scaled_i128(column, scale, v)?);
    }
    Ok(Arc::new(builder.finish()))
}

/// Unscaled integer for `value` at `scale`, e.g. `59.97` at scale 2 → `5997`.
///
/// Extra fractional digits are rounded half away from zero. Values that need
/// more than [`DECIMAL_PRECISION`] digits are rejected.
pub(crate) fn to_scaled_i128(
    column: &'static str,
    scale: i8,
    value: Decimal,
) -> Result<i128, ParquetError> {
    let target = scale as u32;
    let mut scaled = value.round_dp_with_strategy(target, RoundingStrategy::MidpointAwayFromZero);
    scaled.rescale(target);

    let mantissa = scaled.mantissa();
    if scaled.scale() != target || mantissa.abs() >= 10_i128.pow(DECIMAL_PRECISION as u32) {
        return Err(ParquetError::DecimalOverflow {
            column,
            value: value.to_string(),
            precision: DECIMAL_PRECISION,
            scale,
        });
    }
    Ok(mantissa)
}
