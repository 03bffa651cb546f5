//! Transient store factory for runtime backend selection

use std::sync::Arc;

use crate::domain::CacheError;
use crate::domain::transient::TransientStore;
use crate::infrastructure::supervisor::TaskSupervisor;

use super::in_memory::InMemoryTransientStore;
use super::redis::{RedisTransientConfig, RedisTransientStore};

/// Supported transient backends
#[derive(Debug, Clone, PartialEq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransientBackend {
    /// In-memory partitions, lost on process exit
    #[default]
    InMemory,
    /// Redis-backed partitions shared across processes
    Redis,
}

impl std::fmt::Display for TransientBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransientBackend::InMemory => write!(f, "in_memory"),
            TransientBackend::Redis => write!(f, "redis"),
        }
    }
}

impl std::str::FromStr for TransientBackend {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(TransientBackend::InMemory),
            "redis" => Ok(TransientBackend::Redis),
            _ => Err(CacheError::configuration(format!(
                "Unknown transient backend: {}. Valid backends: in_memory, redis",
                s
            ))),
        }
    }
}

/// Configuration for the transient store factory
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct TransientSettings {
    #[serde(default)]
    pub backend: TransientBackend,
    /// Redis URL (required for the Redis backend)
    #[serde(default)]
    pub redis_url: Option<String>,
    /// Key namespace (Redis backend)
    #[serde(default)]
    pub namespace: Option<String>,
}

/// Factory for creating transient store instances
#[derive(Debug, Default)]
pub struct TransientStoreFactory;

impl TransientStoreFactory {
    pub fn new() -> Self {
        Self
    }

    /// Creates a transient store based on configuration
    pub async fn create(
        &self,
        settings: &TransientSettings,
        supervisor: TaskSupervisor,
    ) -> Result<Arc<dyn TransientStore>, CacheError> {
        match settings.backend {
            TransientBackend::InMemory => {
                Ok(Arc::new(InMemoryTransientStore::new(supervisor)))
            }
            TransientBackend::Redis => {
                let url = settings.redis_url.clone().ok_or_else(|| {
                    CacheError::configuration("Redis URL is required for the redis backend")
                })?;

                let mut config = RedisTransientConfig::new(url);

                if let Some(namespace) = &settings.namespace {
                    config = config.with_namespace(namespace.clone());
                }

                let store = RedisTransientStore::new(config, supervisor).await?;
                Ok(Arc::new(store))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::CategoryConfig;
    use crate::domain::transient::TransientStoreExt;

    #[test]
    fn test_backend_from_str() {
        assert_eq!(
            "in_memory".parse::<TransientBackend>().unwrap(),
            TransientBackend::InMemory
        );
        assert_eq!(
            "memory".parse::<TransientBackend>().unwrap(),
            TransientBackend::InMemory
        );
        assert_eq!(
            "REDIS".parse::<TransientBackend>().unwrap(),
            TransientBackend::Redis
        );
    }

    #[test]
    fn test_backend_from_str_invalid() {
        assert!("leveldb".parse::<TransientBackend>().is_err());
    }

    #[tokio::test]
    async fn test_create_in_memory() {
        let factory = TransientStoreFactory::new();
        let store = factory
            .create(&TransientSettings::default(), TaskSupervisor::new())
            .await
            .unwrap();

        store
            .put("quiz", "k", &"v", &CategoryConfig::default())
            .await
            .unwrap();

        let value: Option<String> = store.get("quiz", "k").await.unwrap();
        assert_eq!(value, Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_create_redis_missing_url() {
        let factory = TransientStoreFactory::new();
        let settings = TransientSettings {
            backend: TransientBackend::Redis,
            ..Default::default()
        };

        let result = factory.create(&settings, TaskSupervisor::new()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_backend_display() {
        assert_eq!(TransientBackend::InMemory.to_string(), "in_memory");
        assert_eq!(TransientBackend::Redis.to_string(), "redis");
    }
}
