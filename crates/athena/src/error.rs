/// Errors from building or running a report query.
#[derive(Debug, thiserror::Error)]
pub enum AthenaError {
    #[error("Athena is not enabled in config")]
    NotEnabled,

    /// A database or table name that cannot be spliced into SQL.
    #[error("invalid identifier '{0}': expected [A-Za-z0-9_]+")]
    InvalidIdentifier(String),

    #[error("invalid report limit {0}: expected 1..=1000")]
    InvalidLimit(u32),

    #[error("query {query_id} failed: {reason}")]
    QueryFailed { query_id: String, reason: String },

    #[error("query {query_id} was cancelled")]
    QueryCancelled { query_id: String },

    #[error("query {query_id} timed out after {seconds}s")]
    QueryTimeout { query_id: String, seconds: u32 },

    #[error("scan limit exceeded: {bytes_scanned} bytes scanned, limit is {limit} bytes")]
    ScanLimitExceeded { bytes_scanned: u64, limit: u64 },

    #[error("AWS SDK error: {0}")]
    AwsSdk(String),

    /// Result set does not have the shape the report expects.
    #[error("parse error: {0}")]
    ParseError(String),
}
