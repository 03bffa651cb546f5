//! Durable store factory for runtime backend selection

use std::sync::Arc;

use crate::domain::CacheError;
use crate::domain::durable::DurableStore;

use super::in_memory::InMemoryDurableStore;
use super::postgres::{PostgresConfig, PostgresDurableStore};

/// Supported durable backends
#[derive(Debug, Clone, PartialEq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurableBackend {
    /// In-memory append-only list, lost on process exit
    #[default]
    InMemory,
    /// PostgreSQL document table shared across devices
    Postgres,
}

impl std::fmt::Display for DurableBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DurableBackend::InMemory => write!(f, "in_memory"),
            DurableBackend::Postgres => write!(f, "postgres"),
        }
    }
}

impl std::str::FromStr for DurableBackend {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(DurableBackend::InMemory),
            "postgres" | "postgresql" => Ok(DurableBackend::Postgres),
            _ => Err(CacheError::configuration(format!(
                "Unknown durable backend: {}. Valid backends: in_memory, postgres",
                s
            ))),
        }
    }
}

/// Configuration for the durable store factory
#[derive(Debug, Clone, serde::Deserialize)]
pub struct DurableSettings {
    #[serde(default)]
    pub backend: DurableBackend,
    /// Database URL (required for the Postgres backend)
    #[serde(default)]
    pub database_url: Option<String>,
    /// Table name for cached entries
    #[serde(default = "default_table_name")]
    pub table_name: String,
}

fn default_table_name() -> String {
    "generated_content".to_string()
}

impl Default for DurableSettings {
    fn default() -> Self {
        Self {
            backend: DurableBackend::default(),
            database_url: None,
            table_name: default_table_name(),
        }
    }
}

/// Factory for creating durable store instances
#[derive(Debug, Default)]
pub struct DurableStoreFactory;

impl DurableStoreFactory {
    pub fn new() -> Self {
        Self
    }

    /// Creates a durable store based on configuration
    ///
    /// The Postgres backend connects and runs `ensure_table` before it is
    /// handed out.
    pub async fn create(
        &self,
        settings: &DurableSettings,
    ) -> Result<Arc<dyn DurableStore>, CacheError> {
        match settings.backend {
            DurableBackend::InMemory => Ok(Arc::new(InMemoryDurableStore::new())),
            DurableBackend::Postgres => {
                let url = settings.database_url.clone().ok_or_else(|| {
                    CacheError::configuration(
                        "Database URL is required for the postgres backend",
                    )
                })?;

                let config = PostgresConfig::new(url);
                let store =
                    PostgresDurableStore::connect(&config, settings.table_name.clone()).await?;
                store.ensure_table().await?;

                Ok(Arc::new(store))
            }
        }
    }
}
