//! PostgreSQL durable store implementation with connection pooling

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use crate::domain::CacheError;
use crate::domain::durable::DurableStore;
use crate::domain::entry::{DurableEntry, DurablePayload};

/// PostgreSQL durable store configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/gencache".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn with_idle_timeout(mut self, secs: u64) -> Self {
        self.idle_timeout_secs = secs;
        self
    }
}

/// PostgreSQL durable store
///
/// One row per generated entry; the payload is stored as JSONB. Inserts are
/// append-only with no uniqueness constraint on `(category, prompt)`, so
/// concurrent misses may both land and the row a later lookup returns is
/// unspecified.
pub struct PostgresDurableStore {
    pool: PgPool,
    table_name: String,
}

impl Debug for PostgresDurableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresDurableStore")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl PostgresDurableStore {
    /// Creates a store with an existing pool
    pub fn new(pool: PgPool, table_name: impl Into<String>) -> Self {
        Self {
            pool,
            table_name: table_name.into(),
        }
    }

    /// Creates a store with its own connection pool
    pub async fn connect(
        config: &PostgresConfig,
        table_name: impl Into<String>,
    ) -> Result<Self, CacheError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(std::time::Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| CacheError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Ok(Self::new(pool, table_name))
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Ensures the backing table exists
    pub async fn ensure_table(&self) -> Result<(), CacheError> {
        let query = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id UUID PRIMARY KEY,
                category VARCHAR(255) NOT NULL,
                topic TEXT NOT NULL,
                prompt TEXT NOT NULL,
                payload JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                creator_id VARCHAR(255),
                views BIGINT NOT NULL DEFAULT 0
            )
            "#,
            self.table_name
        );

        sqlx::query(&query)
            .execute(&self.pool)
            .await
            .map_err(|e| CacheError::storage(format!("Failed to create table: {}", e)))?;

        let index = format!(
            "CREATE INDEX IF NOT EXISTS {}_category_prompt_idx ON {} (category, prompt)",
            self.table_name, self.table_name
        );

        sqlx::query(&index)
            .execute(&self.pool)
            .await
            .map_err(|e| CacheError::storage(format!("Failed to create index: {}", e)))?;

        Ok(())
    }

    fn row_to_entry(row: &sqlx::postgres::PgRow) -> Result<DurableEntry, CacheError> {
        let payload: serde_json::Value = row.get("payload");
        let payload: DurablePayload = serde_json::from_value(payload)
            .map_err(|e| CacheError::storage(format!("Failed to deserialize payload: {}", e)))?;

        let created_at: DateTime<Utc> = row.get("created_at");

        Ok(DurableEntry {
            id: row.get("id"),
            category: row.get("category"),
            topic: row.get("topic"),
            prompt: row.get("prompt"),
            payload,
            created_at,
            creator_id: row.get("creator_id"),
            views: row.get("views"),
        })
    }
}

#[async_trait]
impl DurableStore for PostgresDurableStore {
    async fn lookup(
        &self,
        category: &str,
        prompt: &str,
    ) -> Result<Option<DurableEntry>, CacheError> {
        let query = format!(
            "SELECT id, category, topic, prompt, payload, created_at, creator_id, views \
             FROM {} WHERE category = $1 AND prompt = $2 LIMIT 1",
            self.table_name
        );

        let result = sqlx::query(&query)
            .bind(category)
            .bind(prompt)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CacheError::storage(format!("Failed to look up entry: {}", e)))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_entry(&row)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, entry: DurableEntry) -> Result<(), CacheError> {
        let payload = serde_json::to_value(&entry.payload)
            .map_err(|e| CacheError::storage(format!("Failed to serialize payload: {}", e)))?;

        let query = format!(
            r#"
            INSERT INTO {} (id, category, topic, prompt, payload, created_at, creator_id, views)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
            self.table_name
        );

        sqlx::query(&query)
            .bind(entry.id)
            .bind(&entry.category)
            .bind(&entry.topic)
            .bind(&entry.prompt)
            .bind(&payload)
            .bind(entry.created_at)
            .bind(&entry.creator_id)
            .bind(entry.views)
            .execute(&self.pool)
            .await
            .map_err(|e| CacheError::storage(format!("Failed to insert entry: {}", e)))?;

        Ok(())
    }

    async fn increment_views(&self, id: &Uuid) -> Result<(), CacheError> {
        let query = format!(
            "UPDATE {} SET views = views + 1 WHERE id = $1",
            self.table_name
        );

        sqlx::query(&query)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| CacheError::storage(format!("Failed to increment views: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_config_default() {
        let config = PostgresConfig::default();

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.connect_timeout_secs, 30);
        assert_eq!(config.idle_timeout_secs, 600);
    }

    #[test]
    fn test_postgres_config_builder() {
        let config = PostgresConfig::new("postgres://localhost/test")
            .with_max_connections(20)
            .with_min_connections(5)
            .with_connect_timeout(60)
            .with_idle_timeout(300);

        assert_eq!(config.url, "postgres://localhost/test");
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.min_connections, 5);
        assert_eq!(config.connect_timeout_secs, 60);
        assert_eq!(config.idle_timeout_secs, 300);
    }
}
