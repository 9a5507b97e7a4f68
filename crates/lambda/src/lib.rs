//! AWS Lambda entry points for the transaction pipeline.
//!
//! `transform-lambda` turns S3 object-created notifications into
//! [`RecordTransformer`](ecom_transform::RecordTransformer) runs;
//! `generate-lambda` writes one synthetic transaction per invocation.

pub mod event;
pub mod generate;
pub mod telemetry;
pub mod transform;

pub use event::{object_events, S3ObjectEvent};
pub use generate::{handle_generate, GenerateResponse};
pub use telemetry::init_tracing;
pub use transform::{handle_s3_event, s3_accessor, SkippedObject, TransformResponse};
