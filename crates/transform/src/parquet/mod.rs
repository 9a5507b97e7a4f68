//! Encode an [`EnrichedTransaction`](ecom_core::EnrichedTransaction) as a
//! one-row Apache Parquet file.
//!
//! Every column is typed (decimals stay decimals, the timestamp stays a
//! timestamp) so Athena, DuckDB or Polars can read the output without
//! casting. Files are Zstd-compressed.

mod error;
pub(crate) mod schema;
pub(crate) mod builders;
mod writer;

#[cfg(test)]
mod tests;

pub use error::ParquetError;
pub use schema::transaction_schema;
pub use writer::{record_to_batch, write_parquet, write_parquet_bytes};
