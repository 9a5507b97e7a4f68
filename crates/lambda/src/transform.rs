use std::sync::Arc;

use aws_lambda_events::event::s3::S3Event;
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use ecom_core::config::AwsConfig;
use ecom_storage::{
    ObjectRef, ObjectStoreAccessor, S3Backend, StorageAccessor, StorageBackend, StorageError,
};
use ecom_transform::{RecordTransformer, TransformError};

use crate::event::{object_events, S3ObjectEvent};

/// An object that was rejected and will not be retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedObject {
    pub key: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResponse {
    pub status_code: u16,
    pub processed: Vec<String>,
    pub skipped: Vec<SkippedObject>,
}

/// Accessor for the bucket named in the notification.
pub fn s3_accessor(aws: &AwsConfig, bucket: &str) -> Result<Arc<dyn StorageAccessor>, StorageError> {
    let backend = StorageBackend::S3(S3Backend::new(&aws.with_bucket(bucket))?);
    Ok(Arc::new(ObjectStoreAccessor::new(&backend)))
}

async fn process_object(
    object: &S3ObjectEvent,
    accessor_for: &(dyn Fn(&str) -> Result<Arc<dyn StorageAccessor>, StorageError> + Sync),
) -> Result<ObjectRef, TransformError> {
    let transformer = RecordTransformer::new(accessor_for(&object.bucket)?);
    transformer.process(&ObjectRef::new(object.key.as_str())).await
}

/// Transform every object in `event`, concurrently.
///
/// Malformed or invalid records are logged and reported as skipped: retrying
/// them cannot succeed. Any other failure fails the whole invocation so the
/// platform retries it.
pub async fn handle_s3_event<F>(
    event: &S3Event,
    accessor_for: F,
) -> Result<TransformResponse, TransformError>
where
    F: Fn(&str) -> Result<Arc<dyn StorageAccessor>, StorageError> + Sync,
{
    let objects = object_events(event);
    let outcomes = join_all(
        objects
            .iter()
            .map(|object| process_object(object, &accessor_for)),
    )
    .await;

    let mut response = TransformResponse {
        status_code: 200,
        processed: Vec::new(),
        skipped: Vec::new(),
    };
    for (object, outcome) in objects.iter().zip(outcomes) {
        match outcome {
            Ok(output) => response.processed.push(output.key().to_string()),
            Err(e) if e.is_permanent() => {
                warn!(object = %object, error = %e, "skipping unprocessable record");
                response.skipped.push(SkippedObject {
                    key: object.key.clone(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        records = objects.len(),
        processed = response.processed.len(),
        skipped = response.skipped.len(),
        "s3 event handled"
    );
    Ok(response)
}
