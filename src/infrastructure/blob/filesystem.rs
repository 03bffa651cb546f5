//! File-based blob store

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use crate::domain::CacheError;
use crate::domain::blob::BlobStore;

/// Configuration for the filesystem blob store
#[derive(Debug, Clone)]
pub struct FilesystemBlobConfig {
    /// Directory objects are written under
    pub root_dir: PathBuf,
    /// Public base URL objects are served from (e.g. a CDN origin)
    pub base_url: String,
}

impl FilesystemBlobConfig {
    pub fn new(root_dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            base_url: base_url.into(),
        }
    }
}

/// Blob store backed by the local filesystem
///
/// Object paths map directly to files under the root directory; the
/// retrieval URL joins the configured base URL with the object path and is
/// stable while the file exists.
#[derive(Debug)]
pub struct FilesystemBlobStore {
    config: FilesystemBlobConfig,
}

impl FilesystemBlobStore {
    pub fn new(config: FilesystemBlobConfig) -> Self {
        Self { config }
    }

    /// Ensures the root directory exists
    pub async fn init(&self) -> Result<(), CacheError> {
        fs::create_dir_all(&self.config.root_dir)
            .await
            .map_err(|e| {
                CacheError::storage(format!("Failed to create blob root directory: {}", e))
            })?;

        debug!(root_dir = ?self.config.root_dir, "blob store initialized");
        Ok(())
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, CacheError> {
        let relative = Path::new(path);

        // Object paths must stay inside the root directory.
        let escapes = relative.components().any(|component| {
            matches!(component, Component::ParentDir | Component::RootDir | Component::Prefix(_))
        });

        if escapes || path.is_empty() {
            return Err(CacheError::storage(format!("Invalid blob path: {}", path)));
        }

        Ok(self.config.root_dir.join(relative))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(&self, path: &str, bytes: Bytes, mime_type: &str) -> Result<String, CacheError> {
        let file_path = self.resolve(path)?;

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                CacheError::storage(format!("Failed to create blob directory: {}", e))
            })?;
        }

        fs::write(&file_path, &bytes)
            .await
            .map_err(|e| CacheError::storage(format!("Failed to write blob '{}': {}", path, e)))?;

        debug!(path, size = bytes.len(), mime_type, "blob stored");
        Ok(self.url(path))
    }

    async fn url_for(&self, path: &str) -> Result<Option<String>, CacheError> {
        let file_path = self.resolve(path)?;

        match fs::metadata(&file_path).await {
            Ok(metadata) if metadata.is_file() => Ok(Some(self.url(path))),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::storage(format!(
                "Failed to stat blob '{}': {}",
                path, e
            ))),
        }
    }

    async fn delete(&self, path: &str) -> Result<bool, CacheError> {
        let file_path = self.resolve(path)?;

        match fs::remove_file(&file_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::storage(format!(
                "Failed to delete blob '{}': {}",
                path, e
            ))),
        }
    }
}
