//! Blob-tier store trait definition

use std::fmt::Debug;

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::CacheError;

/// Object store for large binary payloads
///
/// A dumb path→bytes map. Path derivation is the caller's responsibility
/// (the orchestrator uses `category/key.ext`); no content-addressing happens
/// here. The returned URL is stable while the object exists.
#[async_trait]
pub trait BlobStore: Send + Sync + Debug {
    /// Stores bytes at the given path, returning the retrieval URL
    async fn put(&self, path: &str, bytes: Bytes, mime_type: &str) -> Result<String, CacheError>;

    /// Returns the retrieval URL for a stored object, if it exists
    async fn url_for(&self, path: &str) -> Result<Option<String>, CacheError>;

    /// Deletes one object, returning whether it existed
    async fn delete(&self, path: &str) -> Result<bool, CacheError>;
}
