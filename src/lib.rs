//! Generative-content cache
//!
//! A tiered, content-addressed cache for expensive AI-generated artifacts
//! (explanatory text, quiz items, narrated audio, short video clips):
//! - a transient per-device tier with TTL and insertion-order eviction,
//! - a durable cross-device document tier that never expires,
//! - a blob tier for large binary payloads addressed by path.
//!
//! The [`engine::ContentCacheEngine`] is built once by the application's
//! composition root; its [`infrastructure::services::ContentCacheService`]
//! returns a cached artifact when one exists and otherwise runs the
//! caller-supplied generator exactly once, persisting the result — or
//! degrading to an uncached result when the binary tier is unreachable.

pub mod config;
pub mod domain;
pub mod engine;
pub mod infrastructure;

pub use config::{AppConfig, CacheSettings, LogFormat, LoggingConfig};
pub use domain::{
    BlobReference, BlobStore, CacheError, CategoryConfig, CategoryRegistry, DurableEntry,
    DurablePayload, DurableStore, Fnv32KeyGenerator, KeyGenerator, KeyParams, MediaOptions,
    MediaPayload, TransientStore, TransientStoreExt, categories,
};
pub use engine::{ContentCacheEngine, EngineBuilder};
pub use infrastructure::observability::init_tracing;
pub use infrastructure::probe::{PersistenceCapability, PersistenceMode};
pub use infrastructure::services::{
    CacheOutcome, ContentCacheService, ContentRequest, Generated, MediaMaterializer,
};
pub use infrastructure::supervisor::TaskSupervisor;
