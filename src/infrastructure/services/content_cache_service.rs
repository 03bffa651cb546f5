//! Generative-content caching service
//!
//! The orchestrator over the durable and blob tiers: tiered lookup, a single
//! generation per miss, tier-aware persistence, and graceful degradation
//! when the binary tier is unreachable. The transient tier is not consulted
//! here; higher-level callers use it as an accelerator in front of this
//! service.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::domain::blob::BlobStore;
use crate::domain::durable::DurableStore;
use crate::domain::entry::{BlobReference, DurableEntry, DurablePayload};
use crate::domain::key::{Fnv32KeyGenerator, KeyGenerator, KeyParams};
use crate::domain::media::{MediaOptions, MediaPayload};
use crate::domain::CacheError;
use crate::infrastructure::probe::PersistenceCapability;
use crate::infrastructure::supervisor::TaskSupervisor;

use super::media::MediaMaterializer;

/// One logical generation request
#[derive(Debug, Clone)]
pub struct ContentRequest {
    pub category: String,
    /// Metadata only; the cache lookup key is `(category, prompt)`.
    pub topic: String,
    pub prompt: String,
    /// Present for binary artifacts; routes persistence through the blob tier
    pub media: Option<MediaOptions>,
    pub creator_id: Option<String>,
}

impl ContentRequest {
    pub fn new(
        category: impl Into<String>,
        topic: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            topic: topic.into(),
            prompt: prompt.into(),
            media: None,
            creator_id: None,
        }
    }

    pub fn with_media(mut self, media: MediaOptions) -> Self {
        self.media = Some(media);
        self
    }

    pub fn with_creator(mut self, creator_id: impl Into<String>) -> Self {
        self.creator_id = Some(creator_id.into());
        self
    }
}

/// Output of a caller-supplied generator
#[derive(Debug, Clone)]
pub enum Generated {
    /// Inline JSON content
    Inline(serde_json::Value),
    /// Binary artifact to be materialized and stored in the blob tier
    Media(MediaPayload),
}

/// What `get_or_generate` hands back to the caller
#[derive(Debug, Clone)]
pub enum CacheOutcome {
    /// Inline content, cached or freshly generated
    Inline(serde_json::Value),
    /// Binary artifact persisted in the blob tier
    MediaUrl(BlobReference),
    /// Freshly generated binary artifact that could not be persisted;
    /// usable immediately but not cached
    RawMedia {
        payload: MediaPayload,
        mime_type: String,
    },
}

impl CacheOutcome {
    /// Retrieval URL when the artifact lives in the blob tier
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::MediaUrl(reference) => Some(&reference.url),
            _ => None,
        }
    }

    /// Inline content, if this outcome carries any
    pub fn into_inline(self) -> Option<serde_json::Value> {
        match self {
            Self::Inline(value) => Some(value),
            _ => None,
        }
    }
}

type BoxedGenerator = Box<dyn FnOnce() -> BoxFuture<'static, Result<Generated, CacheError>> + Send>;

/// Service for caching generated content across the durable and blob tiers
#[derive(Debug)]
pub struct ContentCacheService {
    durable: Arc<dyn DurableStore>,
    blob: Arc<dyn BlobStore>,
    key_generator: Fnv32KeyGenerator,
    capability: PersistenceCapability,
    supervisor: TaskSupervisor,
    materializer: MediaMaterializer,
}

impl ContentCacheService {
    pub fn new(
        durable: Arc<dyn DurableStore>,
        blob: Arc<dyn BlobStore>,
        supervisor: TaskSupervisor,
        capability: PersistenceCapability,
    ) -> Self {
        Self {
            durable,
            blob,
            key_generator: Fnv32KeyGenerator::new(),
            capability,
            supervisor,
            materializer: MediaMaterializer::new(),
        }
    }

    /// Uses a caller-supplied materializer (custom HTTP client)
    pub fn with_materializer(mut self, materializer: MediaMaterializer) -> Self {
        self.materializer = materializer;
        self
    }

    pub fn capability(&self) -> PersistenceCapability {
        self.capability
    }

    /// Derives the stable short key for a request
    ///
    /// Also usable by callers keying the transient tier in front of this
    /// service.
    pub fn derive_key(&self, category: &str, prompt: &str) -> String {
        let params = KeyParams::new(prompt).with_component("category", category);
        self.key_generator.derive(&params)
    }

    /// Returns the cached artifact for the request, generating it on miss
    ///
    /// The generator is invoked at most once, and only on a miss. No lock
    /// coordinates concurrent callers racing the same key: both may miss and
    /// both may generate; generations for the same request are assumed
    /// interchangeable, so the race duplicates cost, not correctness.
    pub async fn get_or_generate<F, Fut>(
        &self,
        request: ContentRequest,
        generator: F,
    ) -> Result<CacheOutcome, CacheError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Generated, CacheError>> + Send + 'static,
    {
        let boxed: BoxedGenerator = Box::new(move || {
            let fut: BoxFuture<'static, Result<Generated, CacheError>> = Box::pin(generator());
            fut
        });

        self.get_or_generate_boxed(request, boxed).await
    }

    /// Typed wrapper for inline content
    ///
    /// Fails with a serialization error when the cached entry holds binary
    /// content instead of an inline value.
    pub async fn get_or_generate_json<T, F, Fut>(
        &self,
        request: ContentRequest,
        generator: F,
    ) -> Result<T, CacheError>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, CacheError>> + Send + 'static,
    {
        let outcome = self
            .get_or_generate(request, move || async move {
                let value = generator().await?;
                let json = serde_json::to_value(&value).map_err(|e| {
                    CacheError::serialization(format!("Failed to serialize generated value: {}", e))
                })?;
                Ok(Generated::Inline(json))
            })
            .await?;

        let value = outcome.into_inline().ok_or_else(|| {
            CacheError::serialization("Cached entry holds binary content, not an inline value")
        })?;

        serde_json::from_value(value).map_err(|e| {
            CacheError::serialization(format!("Failed to deserialize cached value: {}", e))
        })
    }

    async fn get_or_generate_boxed(
        &self,
        request: ContentRequest,
        generator: BoxedGenerator,
    ) -> Result<CacheOutcome, CacheError> {
        // A failed lookup is never treated as a miss: masking an outage
        // behind duplicate generation would hide it and multiply cost.
        let existing = self
            .durable
            .lookup(&request.category, &request.prompt)
            .await
            .map_err(|e| CacheError::lookup(e.to_string()))?;

        if let Some(entry) = existing {
            debug!(
                category = %request.category,
                entry_id = %entry.id,
                "durable cache hit"
            );

            let durable = self.durable.clone();
            let id = entry.id;

            self.supervisor.spawn("durable-view-increment", async move {
                durable.increment_views(&id).await
            });

            return Ok(match entry.payload {
                DurablePayload::Inline { content } => CacheOutcome::Inline(content),
                DurablePayload::Blob { reference } => CacheOutcome::MediaUrl(reference),
            });
        }

        debug!(category = %request.category, "durable cache miss; generating");
        let generated = generator().await?;

        match (generated, request.media.as_ref()) {
            (Generated::Media(payload), Some(options)) => {
                self.persist_media(&request, options.clone(), payload).await
            }
            (Generated::Inline(value), _) => self.persist_inline(&request, value).await,
            (Generated::Media(_), None) => Err(CacheError::generation(
                "Generator returned binary content for a non-media request",
            )),
        }
    }

    async fn persist_inline(
        &self,
        request: &ContentRequest,
        value: serde_json::Value,
    ) -> Result<CacheOutcome, CacheError> {
        let mut entry = DurableEntry::inline(
            &request.category,
            &request.topic,
            &request.prompt,
            value.clone(),
        );

        if let Some(creator_id) = &request.creator_id {
            entry = entry.with_creator(creator_id.clone());
        }

        self.durable
            .insert(entry)
            .await
            .map_err(|e| CacheError::persistence(e.to_string()))?;

        Ok(CacheOutcome::Inline(value))
    }

    async fn persist_media(
        &self,
        request: &ContentRequest,
        options: MediaOptions,
        payload: MediaPayload,
    ) -> Result<CacheOutcome, CacheError> {
        // Degradation policy: read-path availability over cache durability.
        // The artifact is returned uncached; every identical request
        // regenerates until the environment allows persistence.
        if self.capability == PersistenceCapability::Limited {
            warn!(
                category = %request.category,
                "persistence capability limited; returning unpersisted media"
            );

            return Ok(CacheOutcome::RawMedia {
                payload,
                mime_type: options.mime_type,
            });
        }

        let bytes = self.materializer.materialize(payload).await?;

        let key = self.derive_key(&request.category, &request.prompt);
        let path = format!(
            "{}/{}.{}",
            request.category,
            key,
            options.extension_or_guess()
        );

        let url = self
            .blob
            .put(&path, bytes, &options.mime_type)
            .await
            .map_err(|e| CacheError::persistence(e.to_string()))?;

        let reference = BlobReference {
            key: path,
            url,
            mime_type: options.mime_type.clone(),
        };

        let mut entry = DurableEntry::blob(
            &request.category,
            &request.topic,
            &request.prompt,
            reference.clone(),
        );

        if let Some(creator_id) = &request.creator_id {
            entry = entry.with_creator(creator_id.clone());
        }

        // Generation succeeded but the document write failed: the artifact
        // is discarded and the error surfaced. Deliberate tradeoff.
        self.durable
            .insert(entry)
            .await
            .map_err(|e| CacheError::persistence(e.to_string()))?;

        Ok(CacheOutcome::MediaUrl(reference))
    }
}
