pub mod accessor;
pub mod backend;
pub mod error;

pub use accessor::{ObjectRef, ObjectStoreAccessor, StorageAccessor};
pub use backend::{LocalBackend, S3Backend, StorageBackend};
pub use error::StorageError;

/// Content type for Parquet output objects.
pub const CONTENT_TYPE_PARQUET: &str = "application/octet-stream";

/// Content type for raw JSON transaction objects.
pub const CONTENT_TYPE_JSON: &str = "application/json";
