use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The record body, or one of its fields, could not be decoded.
    #[error("malformed input: `{field}` {reason}")]
    MalformedInput { field: String, reason: String },

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("invalid config: {0}")]
    Config(String),
}

impl CoreError {
    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::MalformedInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
