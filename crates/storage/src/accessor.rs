//! Fetch/store seam between the pipeline and object storage.
//!
//! The transformer only ever sees [`StorageAccessor`]; production code hands
//! it an [`ObjectStoreAccessor`] over S3, tests hand it one over
//! [`InMemory`](object_store::memory::InMemory).

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::path::Path;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use tracing::debug;

use crate::backend::StorageBackend;
use crate::error::StorageError;

/// Reference to an object, relative to the accessor's bucket or root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    key: String,
}

impl ObjectRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Fails when the key is not a valid object path, e.g. it contains an
    /// empty segment or a `.`/`..` segment.
    pub fn validate(&self) -> Result<(), StorageError> {
        self.to_path().map(|_| ())
    }

    fn to_path(&self) -> Result<Path, StorageError> {
        Ok(Path::parse(&self.key)?)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl From<&str> for ObjectRef {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Object storage as seen by the pipeline.
#[async_trait]
pub trait StorageAccessor: Send + Sync {
    /// Read the whole object.
    async fn fetch(&self, object: &ObjectRef) -> Result<Bytes, StorageError>;

    /// Write (or overwrite) the whole object.
    async fn store(
        &self,
        object: &ObjectRef,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError>;
}

/// [`StorageAccessor`] backed by any `object_store` implementation.
#[derive(Clone)]
pub struct ObjectStoreAccessor {
    store: Arc<dyn ObjectStore>,
    with_attributes: bool,
    location: String,
}

impl ObjectStoreAccessor {
    pub fn new(backend: &StorageBackend) -> Self {
        Self {
            store: backend.store_arc(),
            with_attributes: backend.supports_attributes(),
            location: backend.location(),
        }
    }

    /// Wrap a bare store. Content types are only recorded when
    /// `with_attributes` is set.
    pub fn from_store(store: Arc<dyn ObjectStore>, with_attributes: bool) -> Self {
        Self {
            location: store.to_string(),
            store,
            with_attributes,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

#[async_trait]
impl StorageAccessor for ObjectStoreAccessor {
    async fn fetch(&self, object: &ObjectRef) -> Result<Bytes, StorageError> {
        let path = object.to_path()?;
        let body = self.store.get(&path).await?.bytes().await?;
        debug!(key = %object, bytes = body.len(), "fetched object");
        Ok(body)
    }

    async fn store(
        &self,
        object: &ObjectRef,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let path = object.to_path()?;
        let len = body.len();

        let mut opts = PutOptions::default();
        if self.with_attributes {
            let mut attributes = Attributes::new();
            attributes.insert(Attribute::ContentType, content_type.to_string().into());
            opts.attributes = attributes;
        }

        self.store.put_opts(&path, PutPayload::from(body), opts).await?;
        debug!(key = %object, bytes = len, content_type, "stored object");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    #[tokio::test]
    async fn store_then_fetch_in_memory() {
        let mem = Arc::new(InMemory::new());
        let accessor = ObjectStoreAccessor::from_store(mem.clone(), true);
        let key = ObjectRef::new("raw/date=2024-03-15/transactions_1.json");

        accessor
            .store(&key, Bytes::from_static(b"{\"a\":1}"), "application/json")
            .await
            .unwrap();
        let body = accessor.fetch(&key).await.unwrap();
        assert_eq!(&body[..], b"{\"a\":1}");

        let got = mem.get(&Path::parse(key.key()).unwrap()).await.unwrap();
        let content_type = got
            .attributes
            .get(&Attribute::ContentType)
            .map(|v| v.as_ref().to_string());
        assert_eq!(content_type.as_deref(), Some("application/json"));
    }

    #[test]
    fn keys_with_empty_or_relative_segments_are_invalid() {
        assert!(ObjectRef::new("raw/date=2024-03-15/transactions_1.json").validate().is_ok());
        for bad in ["raw//t.json", "raw/../t.json", "raw/./t.json"] {
            let err = ObjectRef::new(bad).validate().unwrap_err();
            assert!(matches!(err, StorageError::InvalidKey(_)), "{bad}");
        }
    }

    #[tokio::test]
    async fn fetch_missing_is_object_store_error() {
        let accessor = ObjectStoreAccessor::new(&StorageBackend::memory());
        let err = accessor.fetch(&ObjectRef::new("raw/missing.json")).await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::ObjectStore(object_store::Error::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn local_store_skips_content_type() {
        let tmp = std::env::temp_dir().join("ecom-storage-accessor-test");
        std::fs::remove_dir_all(&tmp).ok();
        let backend = StorageBackend::Local(crate::backend::LocalBackend::new(&tmp).unwrap());
        let accessor = ObjectStoreAccessor::new(&backend);
        let key = ObjectRef::new("processed/date=2024-03-15/t.parquet");

        accessor
            .store(&key, Bytes::from_static(b"PAR1"), crate::CONTENT_TYPE_PARQUET)
            .await
            .unwrap();
        assert!(tmp.join("processed/date=2024-03-15/t.parquet").exists());
        std::fs::remove_dir_all(&tmp).ok();
    }

    #[test]
    fn invalid_keys_are_rejected() {
        assert!(ObjectRef::new("raw//double-slash.json").to_path().is_err());
        assert!(ObjectRef::new("raw/date=2024-03-15/ok.json").to_path().is_ok());
    }
}
