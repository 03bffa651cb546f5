//! Blob store factory for runtime backend selection

use std::sync::Arc;

use crate::domain::CacheError;
use crate::domain::blob::BlobStore;

use super::filesystem::{FilesystemBlobConfig, FilesystemBlobStore};
use super::in_memory::InMemoryBlobStore;

/// Supported blob backends
#[derive(Debug, Clone, PartialEq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlobBackend {
    /// Objects held in process memory, lost on exit
    #[default]
    InMemory,
    /// Objects written under a local directory and served from a base URL
    Filesystem,
}

impl std::fmt::Display for BlobBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlobBackend::InMemory => write!(f, "in_memory"),
            BlobBackend::Filesystem => write!(f, "filesystem"),
        }
    }
}

impl std::str::FromStr for BlobBackend {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(BlobBackend::InMemory),
            "filesystem" | "fs" | "file" => Ok(BlobBackend::Filesystem),
            _ => Err(CacheError::configuration(format!(
                "Unknown blob backend: {}. Valid backends: in_memory, filesystem",
                s
            ))),
        }
    }
}

/// Configuration for the blob store factory
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct BlobSettings {
    #[serde(default)]
    pub backend: BlobBackend,
    /// Root directory (required for the filesystem backend)
    #[serde(default)]
    pub root_dir: Option<String>,
    /// Public base URL (required for the filesystem backend)
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Factory for creating blob store instances
#[derive(Debug, Default)]
pub struct BlobStoreFactory;

impl BlobStoreFactory {
    pub fn new() -> Self {
        Self
    }

    /// Creates a blob store based on configuration
    ///
    /// The filesystem backend creates its root directory before it is
    /// handed out.
    pub async fn create(&self, settings: &BlobSettings) -> Result<Arc<dyn BlobStore>, CacheError> {
        match settings.backend {
            BlobBackend::InMemory => Ok(Arc::new(InMemoryBlobStore::new())),
            BlobBackend::Filesystem => {
                let root_dir = settings.root_dir.clone().ok_or_else(|| {
                    CacheError::configuration(
                        "Root directory is required for the filesystem backend",
                    )
                })?;
                let base_url = settings.base_url.clone().ok_or_else(|| {
                    CacheError::configuration("Base URL is required for the filesystem backend")
                })?;

                let store =
                    FilesystemBlobStore::new(FilesystemBlobConfig::new(root_dir, base_url));
                store.init().await?;

                Ok(Arc::new(store))
            }
        }
    }
}
