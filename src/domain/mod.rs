//! Domain layer: store traits, entry types, key derivation, errors

pub mod blob;
pub mod category;
pub mod durable;
pub mod entry;
mod error;
pub mod key;
pub mod media;
pub mod transient;

pub use blob::BlobStore;
pub use category::{CategoryConfig, CategoryRegistry, categories};
pub use durable::DurableStore;
pub use entry::{BlobReference, DurableEntry, DurablePayload};
pub use error::CacheError;
pub use key::{Fnv32KeyGenerator, KeyGenerator, KeyParams};
pub use media::{MediaOptions, MediaPayload};
pub use transient::{TransientStore, TransientStoreExt};
