//! Engine composition root
//!
//! The engine is constructed explicitly by the application's composition
//! root and passed to consumers; there is no module-level singleton and no
//! load-time side effect. `init` connects the configured backends, runs the
//! persistence probe once, and wires the orchestrator; `close` drains
//! supervised background work.

use std::sync::Arc;

use tracing::info;

use crate::config::CacheSettings;
use crate::domain::CacheError;
use crate::domain::blob::BlobStore;
use crate::domain::category::{CategoryConfig, CategoryRegistry};
use crate::domain::durable::DurableStore;
use crate::domain::transient::TransientStore;
use crate::infrastructure::blob::BlobStoreFactory;
use crate::infrastructure::durable::DurableStoreFactory;
use crate::infrastructure::probe::{PersistenceCapability, resolve_capability};
use crate::infrastructure::services::ContentCacheService;
use crate::infrastructure::supervisor::TaskSupervisor;
use crate::infrastructure::transient::TransientStoreFactory;

/// The generative-content cache engine
///
/// Owns the three tiers and the orchestrator. The transient store is
/// exposed directly: callers use it as an accelerator in front of
/// [`ContentCacheService::get_or_generate`].
#[derive(Debug)]
pub struct ContentCacheEngine {
    transient: Arc<dyn TransientStore>,
    durable: Arc<dyn DurableStore>,
    blob: Arc<dyn BlobStore>,
    service: ContentCacheService,
    registry: CategoryRegistry,
    supervisor: TaskSupervisor,
    capability: PersistenceCapability,
}

impl ContentCacheEngine {
    /// Starts building an engine
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Builds an engine from configuration with default backends
    pub async fn init(settings: CacheSettings) -> Result<Self, CacheError> {
        Self::builder().with_settings(settings).init().await
    }

    pub fn service(&self) -> &ContentCacheService {
        &self.service
    }

    pub fn transient(&self) -> &Arc<dyn TransientStore> {
        &self.transient
    }

    pub fn durable(&self) -> &Arc<dyn DurableStore> {
        &self.durable
    }

    pub fn blob(&self) -> &Arc<dyn BlobStore> {
        &self.blob
    }

    pub fn supervisor(&self) -> &TaskSupervisor {
        &self.supervisor
    }

    pub fn capability(&self) -> PersistenceCapability {
        self.capability
    }

    /// Resolves the retention config for a category
    pub fn config_for(&self, category: &str) -> &CategoryConfig {
        self.registry.config_for(category)
    }

    /// Drains supervised background work before shutdown
    pub async fn close(&self) {
        self.supervisor.wait_idle().await;
        info!(
            background_failures = self.supervisor.failure_count(),
            "cache engine closed"
        );
    }
}

/// Builder for [`ContentCacheEngine`]
///
/// Backends default to the ones selected by the settings; tests and
/// embedders can inject their own store implementations.
#[derive(Default)]
pub struct EngineBuilder {
    settings: CacheSettings,
    transient: Option<Arc<dyn TransientStore>>,
    durable: Option<Arc<dyn DurableStore>>,
    blob: Option<Arc<dyn BlobStore>>,
    registry: Option<CategoryRegistry>,
}

impl EngineBuilder {
    pub fn with_settings(mut self, settings: CacheSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_transient_store(mut self, store: Arc<dyn TransientStore>) -> Self {
        self.transient = Some(store);
        self
    }

    pub fn with_durable_store(mut self, store: Arc<dyn DurableStore>) -> Self {
        self.durable = Some(store);
        self
    }

    pub fn with_blob_store(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.blob = Some(store);
        self
    }

    pub fn with_registry(mut self, registry: CategoryRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Connects backends, probes persistence capability once, and wires the
    /// orchestrator
    pub async fn init(self) -> Result<ContentCacheEngine, CacheError> {
        let supervisor = TaskSupervisor::new();

        let transient = match self.transient {
            Some(store) => store,
            None => {
                TransientStoreFactory::new()
                    .create(&self.settings.transient, supervisor.clone())
                    .await?
            }
        };

        let durable = match self.durable {
            Some(store) => store,
            None => {
                DurableStoreFactory::new()
                    .create(&self.settings.durable)
                    .await?
            }
        };

        let blob = match self.blob {
            Some(store) => store,
            None => BlobStoreFactory::new().create(&self.settings.blob).await?,
        };

        let capability = resolve_capability(self.settings.persistence, blob.as_ref()).await;

        let registry = self
            .registry
            .unwrap_or_else(CategoryRegistry::with_defaults)
            .apply_overrides(self.settings.categories.clone());

        let service = ContentCacheService::new(
            durable.clone(),
            blob.clone(),
            supervisor.clone(),
            capability,
        );

        info!(
            transient = %self.settings.transient.backend,
            durable = %self.settings.durable.backend,
            blob = %self.settings.blob.backend,
            ?capability,
            "cache engine initialized"
        );

        Ok(ContentCacheEngine {
            transient,
            durable,
            blob,
            service,
            registry,
            supervisor,
            capability,
        })
    }
}
