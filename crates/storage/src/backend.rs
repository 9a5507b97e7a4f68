use std::path::{Path, PathBuf};
use std::sync::Arc;

use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::ObjectStore;
use tracing::info;

use ecom_core::config::{AwsConfig, BackendKind, Config};

use crate::error::StorageError;

/// Unified storage backend wrapping object_store.
pub enum StorageBackend {
    Local(LocalBackend),
    S3(S3Backend),
    Memory(Arc<InMemory>),
}

impl StorageBackend {
    /// Select the backend named by `STORAGE_BACKEND` (or implied by `S3_BUCKET`).
    pub fn from_config(config: &Config) -> Result<Self, StorageError> {
        match config.storage.backend {
            BackendKind::S3 => Ok(StorageBackend::S3(S3Backend::new(&config.aws)?)),
            BackendKind::Local => {
                Ok(StorageBackend::Local(LocalBackend::new(&config.storage.data_dir)?))
            }
            BackendKind::Memory => Ok(Self::memory()),
        }
    }

    /// Fresh, empty in-memory store.
    pub fn memory() -> Self {
        info!("Storage: in-memory backend");
        StorageBackend::Memory(Arc::new(InMemory::new()))
    }

    /// Shared handle to the underlying store.
    pub fn store_arc(&self) -> Arc<dyn ObjectStore> {
        match self {
            StorageBackend::Local(b) => b.store.clone(),
            StorageBackend::S3(b) => b.store.clone(),
            StorageBackend::Memory(m) => m.clone(),
        }
    }

    /// Whether `put` accepts object attributes such as Content-Type.
    /// The local filesystem store rejects them.
    pub fn supports_attributes(&self) -> bool {
        !matches!(self, StorageBackend::Local(_))
    }

    /// Human-readable root, e.g. `s3://bucket` or `file:///srv/data`.
    pub fn location(&self) -> String {
        match self {
            StorageBackend::Local(b) => format!("file://{}", b.data_dir.display()),
            StorageBackend::S3(b) => format!("s3://{}", b.bucket),
            StorageBackend::Memory(_) => "memory://".to_string(),
        }
    }
}

/// Local filesystem backend.
pub struct LocalBackend {
    pub store: Arc<dyn ObjectStore>,
    pub data_dir: PathBuf,
}

impl LocalBackend {
    pub fn new(data_dir: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(data_dir)?;
        let canonical = std::fs::canonicalize(data_dir).unwrap_or_else(|_| data_dir.to_path_buf());
        let store = LocalFileSystem::new_with_prefix(&canonical)
            .map_err(|e| StorageError::Other(format!("local filesystem error: {e}")))?;
        info!("Storage: local backend at {}", canonical.display());
        Ok(Self {
            store: Arc::new(store),
            data_dir: canonical,
        })
    }
}

/// S3 backend bound to a single bucket.
pub struct S3Backend {
    pub store: Arc<dyn ObjectStore>,
    pub bucket: String,
}

impl S3Backend {
    pub fn new(aws: &AwsConfig) -> Result<Self, StorageError> {
        let bucket = aws
            .s3_bucket
            .as_deref()
            .ok_or_else(|| StorageError::NotConfigured("S3_BUCKET not set".into()))?;

        let mut builder = AmazonS3Builder::from_env()
            .with_region(&aws.region)
            .with_bucket_name(bucket);

        if let Some(ref key) = aws.access_key_id {
            builder = builder.with_access_key_id(key);
        }
        if let Some(ref secret) = aws.secret_access_key {
            builder = builder.with_secret_access_key(secret);
        }
        if let Some(ref token) = aws.session_token {
            builder = builder.with_token(token);
        }

        if let Some(ref endpoint) = aws.endpoint_url {
            // object_store requires an absolute URL
            let endpoint_url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
                endpoint.clone()
            } else {
                format!("https://{}", endpoint)
            };
            builder = builder
                .with_endpoint(&endpoint_url)
                .with_allow_http(endpoint_url.starts_with("http://"));
        }

        let store = builder.build()?;

        info!("Storage: S3 backend s3://{} (region: {})", bucket, aws.region);

        Ok(Self {
            store: Arc::new(store),
            bucket: bucket.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_backend_creates_missing_dir() {
        let tmp = std::env::temp_dir().join("ecom-storage-backend-test").join("nested");
        std::fs::remove_dir_all(&tmp).ok();
        let backend = LocalBackend::new(&tmp).unwrap();
        assert!(tmp.exists());

        let backend = StorageBackend::Local(backend);
        assert!(!backend.supports_attributes());
        assert!(backend.location().starts_with("file://"));
        std::fs::remove_dir_all(&tmp).ok();
    }

    #[test]
    fn memory_backend_supports_attributes() {
        let backend = StorageBackend::memory();
        assert!(backend.supports_attributes());
        assert_eq!(backend.location(), "memory://");
    }

    #[test]
    fn s3_backend_requires_bucket() {
        let aws = AwsConfig {
            region: "us-east-1".into(),
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            s3_bucket: None,
            endpoint_url: None,
        };
        assert!(matches!(S3Backend::new(&aws), Err(StorageError::NotConfigured(_))));
    }

    #[test]
    fn s3_backend_builds_without_network() {
        let aws = AwsConfig {
            region: "us-east-1".into(),
            access_key_id: Some("AKIDEXAMPLE".into()),
            secret_access_key: Some("secret".into()),
            session_token: None,
            s3_bucket: Some("ecommerce-data".into()),
            endpoint_url: Some("localhost:9000".into()),
        };
        let backend = StorageBackend::S3(S3Backend::new(&aws).unwrap());
        assert_eq!(backend.location(), "s3://ecommerce-data");
    }
}
