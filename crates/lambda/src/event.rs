use std::borrow::Cow;
use std::fmt;

use aws_lambda_events::event::s3::S3Event;
use tracing::warn;

/// Bucket and decoded key of one object named in an S3 notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3ObjectEvent {
    pub bucket: String,
    pub key: String,
}

impl fmt::Display for S3ObjectEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// S3 form-encodes keys in notifications: spaces arrive as `+`, everything
/// else percent-encoded.
pub fn decode_key(raw: &str) -> String {
    let plus_decoded = raw.replace('+', " ");
    urlencoding::decode(&plus_decoded)
        .map(Cow::into_owned)
        .unwrap_or(plus_decoded)
}

/// Objects referenced by `event`. Records without a bucket name or key are
/// logged and dropped.
pub fn object_events(event: &S3Event) -> Vec<S3ObjectEvent> {
    event
        .records
        .iter()
        .filter_map(|record| {
            let bucket = record.s3.bucket.name.as_deref();
            let key = record.s3.object.key.as_deref();
            match (bucket, key) {
                (Some(bucket), Some(key)) if !bucket.is_empty() && !key.is_empty() => {
                    Some(S3ObjectEvent {
                        bucket: bucket.to_string(),
                        key: decode_key(key),
                    })
                }
                _ => {
                    warn!(event_name = ?record.event_name, "S3 record without bucket or key");
                    None
                }
            }
        })
        .collect()
}
