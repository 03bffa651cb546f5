//! Application configuration

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::category::CategoryConfig;
use crate::infrastructure::blob::BlobSettings;
use crate::infrastructure::durable::DurableSettings;
use crate::infrastructure::probe::PersistenceMode;
use crate::infrastructure::transient::TransientSettings;

/// Top-level configuration for the cache engine
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Backend selection and tuning for the three cache tiers
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    #[serde(default)]
    pub transient: TransientSettings,
    #[serde(default)]
    pub durable: DurableSettings,
    #[serde(default)]
    pub blob: BlobSettings,
    /// How persistence capability is decided at startup
    #[serde(default)]
    pub persistence: PersistenceMode,
    /// Per-category overrides merged over the built-in table
    #[serde(default)]
    pub categories: HashMap<String, CategoryConfig>,
}

impl AppConfig {
    /// Loads configuration from files and the environment
    ///
    /// Sources, later ones winning: `config/default`, `config/local`, then
    /// environment variables prefixed `GENCACHE__` (e.g.
    /// `GENCACHE__CACHE__DURABLE__DATABASE_URL`).
    pub fn load() -> Result<Self, config::ConfigError> {
        // Populate the process environment from a local .env in development.
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("GENCACHE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
