use chrono::NaiveDateTime;
use serde::Serialize;

use ecom_core::config::GeneratorConfig;
use ecom_generator::{GeneratorError, TransactionGenerator};
use ecom_storage::StorageAccessor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub status_code: u16,
    pub key: String,
}

/// Write one random transaction to its `raw/` key.
pub async fn handle_generate(
    config: &GeneratorConfig,
    storage: &dyn StorageAccessor,
    now: NaiveDateTime,
) -> Result<GenerateResponse, GeneratorError> {
    let mut generator = TransactionGenerator::new(config)?;
    let key = generator.emit(storage, now).await?;
    Ok(GenerateResponse {
        status_code: 200,
        key: key.key().to_string(),
    })
}
