use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use tracing::{debug, info};

use ecom_core::{EnrichedTransaction, RawTransaction};
use ecom_storage::{ObjectRef, StorageAccessor, CONTENT_TYPE_PARQUET};

use crate::error::TransformError;
use crate::parquet::write_parquet_bytes;
use crate::path::derive_output_key;
use crate::record::transform;

fn addressable(object: &ObjectRef) -> Result<(), TransformError> {
    object
        .validate()
        .map_err(|e| TransformError::malformed("key", format!("'{object}' {e}")))
}

/// Turns one raw JSON object into one Parquet object.
///
/// Holds no state besides the injected accessor, so a single instance can be
/// shared across concurrent invocations.
#[derive(Clone)]
pub struct RecordTransformer {
    storage: Arc<dyn StorageAccessor>,
}

impl RecordTransformer {
    pub fn new(storage: Arc<dyn StorageAccessor>) -> Self {
        Self { storage }
    }

    /// Pure transform; see [`crate::record::transform`].
    pub fn transform(&self, raw: &RawTransaction) -> Result<EnrichedTransaction, TransformError> {
        transform(raw)
    }

    /// Decode, transform and encode a JSON body without touching storage.
    pub fn encode(&self, body: &[u8]) -> Result<(EnrichedTransaction, Vec<u8>), TransformError> {
        let raw = RawTransaction::from_json(body)?;
        let enriched = transform(&raw)?;
        let parquet = write_parquet_bytes(&enriched)?;
        Ok((enriched, parquet))
    }

    /// Fetch `source`, transform it, and store the Parquet output next to it
    /// under `processed/`. Returns the reference that was written.
    ///
    /// Nothing is stored unless every earlier step succeeded. Storage errors
    /// are returned unchanged.
    pub async fn process(&self, source: &ObjectRef) -> Result<ObjectRef, TransformError> {
        let start = Instant::now();
        addressable(source)?;
        let output = ObjectRef::new(derive_output_key(source.key())?);
        addressable(&output)?;

        let body = self.storage.fetch(source).await?;
        let (enriched, parquet) = self.encode(&body)?;
        debug!(
            transaction_id = %enriched.transaction_id,
            total_amount = %enriched.total_amount,
            parquet_bytes = parquet.len(),
            "encoded transaction"
        );

        self.storage
            .store(&output, Bytes::from(parquet), CONTENT_TYPE_PARQUET)
            .await?;

        info!(
            source = %source,
            output = %output,
            transaction_id = %enriched.transaction_id,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "transformed record"
        );
        Ok(output)
    }
}
