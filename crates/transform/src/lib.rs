//! Single-record transform from a raw JSON transaction to a Parquet row.
//!
//! [`transform`] is the pure part: parse, validate, derive. [`RecordTransformer`]
//! wraps it with the fetch/store plumbing and the `raw/` → `processed/`
//! key mapping.

pub mod error;
pub mod parquet;
pub mod path;
pub mod record;
pub mod transformer;

pub use error::TransformError;
pub use crate::parquet::{record_to_batch, write_parquet, write_parquet_bytes, ParquetError};
pub use path::derive_output_key;
pub use record::{parse_timestamp, transform};
pub use transformer::RecordTransformer;
