//! In-memory blob store implementation

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::CacheError;
use crate::domain::blob::BlobStore;

/// Thread-safe in-memory blob store
///
/// Objects live in process memory and URLs use the `mem://` scheme; useful
/// for testing and development.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    objects: RwLock<HashMap<String, (Bytes, String)>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored bytes for a path, for assertions in tests
    pub fn bytes_for(&self, path: &str) -> Option<Bytes> {
        self.objects
            .read()
            .ok()
            .and_then(|objects| objects.get(path).map(|(bytes, _)| bytes.clone()))
    }

    fn url(path: &str) -> String {
        format!("mem://{}", path)
    }

    fn lock_error<E: std::fmt::Display>(e: E) -> CacheError {
        CacheError::storage(format!("Failed to acquire lock: {}", e))
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, path: &str, bytes: Bytes, mime_type: &str) -> Result<String, CacheError> {
        let mut objects = self.objects.write().map_err(Self::lock_error)?;
        objects.insert(path.to_string(), (bytes, mime_type.to_string()));
        Ok(Self::url(path))
    }

    async fn url_for(&self, path: &str) -> Result<Option<String>, CacheError> {
        let objects = self.objects.read().map_err(Self::lock_error)?;
        Ok(objects.contains_key(path).then(|| Self::url(path)))
    }

    async fn delete(&self, path: &str) -> Result<bool, CacheError> {
        let mut objects = self.objects.write().map_err(Self::lock_error)?;
        Ok(objects.remove(path).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_returns_mem_url() {
        let store = InMemoryBlobStore::new();

        let url = store
            .put("narrated-audio/abc.mp3", Bytes::from_static(b"id3"), "audio/mpeg")
            .await
            .unwrap();

        assert_eq!(url, "mem://narrated-audio/abc.mp3");
    }

    #[tokio::test]
    async fn test_url_for_missing() {
        let store = InMemoryBlobStore::new();
        assert_eq!(store.url_for("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryBlobStore::new();

        store
            .put("p", Bytes::from_static(b"x"), "application/octet-stream")
            .await
            .unwrap();

        assert!(store.delete("p").await.unwrap());
        assert!(!store.delete("p").await.unwrap());
    }

    #[tokio::test]
    async fn test_bytes_for() {
        let store = InMemoryBlobStore::new();

        store
            .put("p", Bytes::from_static(b"payload"), "application/octet-stream")
            .await
            .unwrap();

        assert_eq!(store.bytes_for("p"), Some(Bytes::from_static(b"payload")));
    }
}
