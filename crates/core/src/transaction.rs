//! Raw and enriched e-commerce transaction records.
//!
//! A [`RawTransaction`] is what the generator writes under `raw/`: a flat
//! JSON object with string identifiers, an ISO-8601 timestamp, an integer
//! quantity and a decimal price. An [`EnrichedTransaction`] is the same
//! record after calendar and monetary fields have been derived, ready to be
//! written as a Parquet row under `processed/`.

use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::error::CoreError;

type Object = Map<String, Value>;

/// An unvalidated purchase record as produced upstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawTransaction {
    pub transaction_id: String,
    /// ISO-8601 timestamp, kept verbatim until the transform parses it.
    pub timestamp: String,
    pub customer_id: String,
    pub product_id: String,
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub category: String,
    /// Ignored by the transform, which always recomputes it.
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_amount: Option<Decimal>,
}

impl RawTransaction {
    /// Decode a single JSON object.
    ///
    /// Missing fields, `null` values and values of the wrong JSON type are
    /// reported as [`CoreError::MalformedInput`] naming the field. Unknown
    /// extra fields are ignored.
    pub fn from_json(bytes: &[u8]) -> Result<Self, CoreError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| CoreError::malformed("body", format!("is not valid JSON: {e}")))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, CoreError> {
        let obj = value
            .as_object()
            .ok_or_else(|| CoreError::malformed("body", "is not a JSON object"))?;

        Ok(Self {
            transaction_id: required_id(obj, "transaction_id")?,
            timestamp: required_str(obj, "timestamp")?.to_string(),
            customer_id: required_id(obj, "customer_id")?,
            product_id: required_id(obj, "product_id")?,
            quantity: required_integer(obj, "quantity")?,
            price: required_decimal(obj, "price")?,
            category: required_str(obj, "category")?.to_string(),
            total_amount: optional_decimal(obj, "total_amount")?,
        })
    }

    /// Encode back to the JSON wire form (numbers stay JSON numbers).
    pub fn to_json(&self) -> Result<Vec<u8>, CoreError> {
        serde_json::to_vec(self).map_err(|e| CoreError::Serialize(e.to_string()))
    }
}

/// A raw transaction augmented with derived calendar and monetary fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedTransaction {
    pub transaction_id: String,
    pub timestamp: NaiveDateTime,
    pub customer_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub price: Decimal,
    pub category: String,
    pub total_amount: Decimal,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    /// Monday = 0 … Sunday = 6.
    pub day_of_week: u32,
    pub discount: Decimal,
    pub final_amount: Decimal,
}

// ── Field extraction ──────────────────────────────────────────

fn present<'a>(obj: &'a Object, field: &str) -> Result<&'a Value, CoreError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(CoreError::malformed(field, "is required")),
        Some(v) => Ok(v),
    }
}

fn required_str<'a>(obj: &'a Object, field: &str) -> Result<&'a str, CoreError> {
    present(obj, field)?
        .as_str()
        .ok_or_else(|| CoreError::malformed(field, "must be a string"))
}

/// Identifier fields must be non-empty strings.
fn required_id(obj: &Object, field: &str) -> Result<String, CoreError> {
    let s = required_str(obj, field)?;
    if s.trim().is_empty() {
        return Err(CoreError::malformed(field, "must not be empty"));
    }
    Ok(s.to_string())
}

fn required_integer(obj: &Object, field: &str) -> Result<i64, CoreError> {
    present(obj, field)?
        .as_i64()
        .ok_or_else(|| CoreError::malformed(field, "must be an integer"))
}

fn required_decimal(obj: &Object, field: &str) -> Result<Decimal, CoreError> {
    match present(obj, field)? {
        Value::Number(n) => number_to_decimal(field, n),
        _ => Err(CoreError::malformed(field, "must be a number")),
    }
}

fn optional_decimal(obj: &Object, field: &str) -> Result<Option<Decimal>, CoreError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => number_to_decimal(field, n).map(Some),
        Some(_) => Err(CoreError::malformed(field, "must be a number")),
    }
}

/// Convert through the number's shortest decimal text so that `19.99`
/// becomes exactly `19.99` rather than its binary approximation.
fn number_to_decimal(field: &str, n: &Number) -> Result<Decimal, CoreError> {
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| CoreError::malformed(field, format!("{text} is not representable as a decimal")))
}
