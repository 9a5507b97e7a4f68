//! Error types for Parquet encoding.

/// Errors that can occur while building or writing the Parquet row.
#[derive(Debug, thiserror::Error)]
pub enum ParquetError {
    /// Failed to build Arrow arrays from the record.
    #[error("Arrow conversion error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Failed to write Parquet file.
    #[error("Parquet write error: {0}")]
    Write(#[from] parquet::errors::ParquetError),

    /// A decimal does not fit the column's declared precision.
    #[error("value {value} does not fit column {column} as decimal({precision}, {scale})")]
    DecimalOverflow {
        column: &'static str,
        value: String,
        precision: u8,
        scale: i8,
    },

    /// I/O error when creating/writing the output file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
