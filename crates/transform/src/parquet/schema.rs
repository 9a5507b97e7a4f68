//! Column layout of a processed transaction.

use arrow::datatypes::{DataType, Field, Schema, TimeUnit};

/// Precision shared by all decimal columns (Athena `decimal(18, s)`).
pub(crate) const DECIMAL_PRECISION: u8 = 18;

/// Scale of `total_amount`, `discount` and `final_amount`.
pub(crate) const AMOUNT_SCALE: i8 = 2;

/// Unit prices keep sub-cent precision.
pub(crate) const PRICE_SCALE: i8 = 4;

/// Arrow schema for an enriched transaction, in column order.
///
/// `timestamp` carries no timezone: the source wall clock is written as-is.
pub fn transaction_schema() -> Schema {
    let amount = DataType::Decimal128(DECIMAL_PRECISION, AMOUNT_SCALE);
    Schema::new(vec![
        Field::new("transaction_id", DataType::Utf8, false),
        Field::new("timestamp", DataType::Timestamp(TimeUnit::Microsecond, None), false),
        Field::new("customer_id", DataType::Utf8, false),
        Field::new("product_id", DataType::Utf8, false),
        Field::new("quantity", DataType::Int64, false),
        Field::new("price", DataType::Decimal128(DECIMAL_PRECISION, PRICE_SCALE), false),
        Field::new("category", DataType::Utf8, false),
        Field::new("total_amount", amount.clone(), false),
        Field::new("year", DataType::Int32, false),
        Field::new("month", DataType::Int32, false),
        Field::new("day", DataType::Int32, false),
        Field::new("hour", DataType::Int32, false),
        Field::new("day_of_week", DataType::Int32, false),
        Field::new("discount", amount.clone(), false),
        Field::new("final_amount", amount, false),
    ])
}
