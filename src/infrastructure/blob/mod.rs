//! Blob-tier store implementations

mod factory;
mod filesystem;
mod in_memory;

pub use factory::{BlobBackend, BlobSettings, BlobStoreFactory};
pub use filesystem::{FilesystemBlobConfig, FilesystemBlobStore};
pub use in_memory::InMemoryBlobStore;
