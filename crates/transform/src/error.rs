use thiserror::Error;

use ecom_core::CoreError;
use ecom_storage::StorageError;

use crate::parquet::ParquetError;

/// Why a single invocation failed. Nothing is written on any of these.
#[derive(Error, Debug)]
pub enum TransformError {
    /// Body is not a JSON object, a required field is absent or mistyped,
    /// or the timestamp cannot be parsed.
    #[error("malformed input: `{field}` {reason}")]
    MalformedInput { field: String, reason: String },

    /// `quantity` or `price` is not strictly positive, or an amount does not
    /// fit its output column.
    #[error("validation failed: `{field}` {reason}")]
    Validation { field: String, reason: String },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("parquet encoding failed: {0}")]
    Encode(#[from] ParquetError),
}

impl TransformError {
    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        TransformError::MalformedInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        TransformError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field for input errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            TransformError::MalformedInput { field, .. }
            | TransformError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Retrying the same input cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            TransformError::MalformedInput { .. }
                | TransformError::Validation { .. }
                | TransformError::Encode(ParquetError::DecimalOverflow { .. })
        )
    }
}

impl From<CoreError> for TransformError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MalformedInput { field, reason } => {
                TransformError::MalformedInput { field, reason }
            }
            other => TransformError::malformed("body", other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_permanent() {
        assert!(TransformError::malformed("timestamp", "bad").is_permanent());
        assert!(TransformError::validation("price", "must be > 0").is_permanent());
        let storage = TransformError::Storage(StorageError::Other("throttled".into()));
        assert!(!storage.is_permanent());
        assert_eq!(storage.field(), None);
    }

    #[test]
    fn decimal_overflow_is_permanent() {
        let err = TransformError::from(ParquetError::DecimalOverflow {
            column: "price",
            value: "100000000000000".into(),
            precision: 18,
            scale: 4,
        });
        assert!(err.is_permanent());
    }

    #[test]
    fn storage_errors_pass_through_display() {
        let err = TransformError::from(StorageError::NotConfigured("S3_BUCKET not set".into()));
        assert_eq!(err.to_string(), "not configured: S3_BUCKET not set");
    }

    #[test]
    fn core_errors_keep_field() {
        let err = TransformError::from(CoreError::malformed("quantity", "must be an integer"));
        assert_eq!(err.field(), Some("quantity"));
        assert_eq!(err.to_string(), "malformed input: `quantity` must be an integer");
    }
}
