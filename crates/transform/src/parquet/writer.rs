//! Public API for writing an enriched transaction as Parquet.

use std::path::Path;
use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use tracing::debug;

use ecom_core::EnrichedTransaction;

use super::builders::build_arrays;
use super::error::ParquetError;
use super::schema::transaction_schema;

/// Writer name recorded in the footer metadata.
const WRITER_NAME: &str = concat!("ecom-transform ", env!("CARGO_PKG_VERSION"));

/// Convert one [`EnrichedTransaction`] into a single-row Arrow [`RecordBatch`].
pub fn record_to_batch(record: &EnrichedTransaction) -> Result<RecordBatch, ParquetError> {
    let schema = Arc::new(transaction_schema());
    let arrays = build_arrays(std::slice::from_ref(record))?;
    let batch = RecordBatch::try_new(schema, arrays)?;
    Ok(batch)
}

fn writer_properties(record: &EnrichedTransaction) -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::ZSTD(Default::default()))
        .set_key_value_metadata(Some(vec![
            parquet::format::KeyValue::new(
                "ecom.transaction_id".to_string(),
                Some(record.transaction_id.clone()),
            ),
            parquet::format::KeyValue::new("ecom.writer".to_string(), Some(WRITER_NAME.to_string())),
        ]))
        .build()
}

/// Write the record to a Parquet file at the given path, creating parent
/// directories as needed.
pub fn write_parquet(record: &EnrichedTransaction, path: &Path) -> Result<u64, ParquetError> {
    let batch = record_to_batch(record)?;
    let row_count = batch.num_rows() as u64;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(writer_properties(record)))?;
    writer.write(&batch)?;
    writer.close()?;

    debug!(
        path = %path.display(),
        rows = row_count,
        transaction_id = %record.transaction_id,
        "Wrote Parquet file"
    );

    Ok(row_count)
}

/// Write the record to an in-memory Parquet buffer.
///
/// Returns the raw bytes of a valid Parquet file, ready to hand to a
/// storage accessor.
pub fn write_parquet_bytes(record: &EnrichedTransaction) -> Result<Vec<u8>, ParquetError> {
    let batch = record_to_batch(record)?;

    let mut buf = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buf, batch.schema(), Some(writer_properties(record)))?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(buf)
}
