//! Infrastructure services

mod content_cache_service;
mod media;

pub use content_cache_service::{CacheOutcome, ContentCacheService, ContentRequest, Generated};
pub use media::MediaMaterializer;
