//! Redis transient store implementation

use std::fmt;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use crate::domain::CacheError;
use crate::domain::category::CategoryConfig;
use crate::domain::transient::TransientStore;
use crate::infrastructure::supervisor::TaskSupervisor;

/// Configuration for the Redis transient store
#[derive(Debug, Clone)]
pub struct RedisTransientConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Namespace prefix for every key written by this store
    pub namespace: String,
}

impl Default for RedisTransientConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            namespace: "gencache".to_string(),
        }
    }
}

impl RedisTransientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }
}

/// Redis-backed transient store
///
/// Value keys carry the entry TTL via `SET EX`; a per-category sorted set
/// keeps the insertion order used for capacity eviction. Cleanup after each
/// put prunes index members whose value key has expired, then trims the
/// category to its most recently inserted entries.
#[derive(Clone)]
pub struct RedisTransientStore {
    connection: ConnectionManager,
    config: RedisTransientConfig,
    supervisor: TaskSupervisor,
}

impl fmt::Debug for RedisTransientStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisTransientStore")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisTransientStore {
    /// Creates a new Redis transient store connection
    pub async fn new(
        config: RedisTransientConfig,
        supervisor: TaskSupervisor,
    ) -> Result<Self, CacheError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| CacheError::storage(format!("Failed to create Redis client: {}", e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::storage(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self {
            connection,
            config,
            supervisor,
        })
    }

    fn value_key(&self, category: &str, key: &str) -> String {
        format!("{}:{}:{}", self.config.namespace, category, key)
    }

    fn index_key(&self, category: &str) -> String {
        format!("{}:{}:__index", self.config.namespace, category)
    }

    fn seq_key(&self, category: &str) -> String {
        format!("{}:{}:__seq", self.config.namespace, category)
    }

    fn storage_error(operation: &str, e: impl fmt::Display) -> CacheError {
        CacheError::storage(format!("Redis {} failed: {}", operation, e))
    }

    /// Two-phase cleanup over one category's insertion index
    async fn cleanup(
        mut conn: ConnectionManager,
        namespace: String,
        category: String,
        max_entries: usize,
    ) -> Result<(), CacheError> {
        let index_key = format!("{}:{}:__index", namespace, category);

        let members: Vec<String> = conn
            .zrange(&index_key, 0, -1)
            .await
            .map_err(|e| Self::storage_error("ZRANGE", e))?;

        // Phase 1: drop index members whose value key already expired.
        let mut live = Vec::with_capacity(members.len());

        for member in members {
            let value_key = format!("{}:{}:{}", namespace, category, member);
            let exists: bool = conn
                .exists(&value_key)
                .await
                .map_err(|e| Self::storage_error("EXISTS", e))?;

            if exists {
                live.push(member);
            } else {
                let _: () = conn
                    .zrem(&index_key, &member)
                    .await
                    .map_err(|e| Self::storage_error("ZREM", e))?;
            }
        }

        // Phase 2: trim to the most recently inserted entries. The index is
        // score-ordered by insertion seq, so the front is the oldest.
        if live.len() > max_entries {
            let excess = live.len() - max_entries;

            for member in live.into_iter().take(excess) {
                let value_key = format!("{}:{}:{}", namespace, category, member);
                let _: () = conn
                    .del(&value_key)
                    .await
                    .map_err(|e| Self::storage_error("DEL", e))?;
                let _: () = conn
                    .zrem(&index_key, &member)
                    .await
                    .map_err(|e| Self::storage_error("ZREM", e))?;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl TransientStore for RedisTransientStore {
    async fn get_raw(&self, category: &str, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection.clone();

        let result: Option<String> = conn
            .get(self.value_key(category, key))
            .await
            .map_err(|e| Self::storage_error("GET", e))?;

        // Value key gone (expired or deleted): drop the stale index member.
        if result.is_none() {
            let _: () = conn
                .zrem(self.index_key(category), key)
                .await
                .map_err(|e| Self::storage_error("ZREM", e))?;
        }

        Ok(result)
    }

    async fn put_raw(
        &self,
        category: &str,
        key: &str,
        value: &str,
        config: &CategoryConfig,
    ) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        let value_key = self.value_key(category, key);

        match config.max_age {
            Some(max_age) => {
                let ttl_secs = max_age.as_secs().max(1);
                let _: () = conn
                    .set_ex(&value_key, value, ttl_secs)
                    .await
                    .map_err(|e| Self::storage_error("SET EX", e))?;
            }
            None => {
                let _: () = conn
                    .set(&value_key, value)
                    .await
                    .map_err(|e| Self::storage_error("SET", e))?;
            }
        }

        let seq: u64 = conn
            .incr(self.seq_key(category), 1)
            .await
            .map_err(|e| Self::storage_error("INCR", e))?;

        let _: () = conn
            .zadd(self.index_key(category), key, seq)
            .await
            .map_err(|e| Self::storage_error("ZADD", e))?;

        let cleanup_conn = self.connection.clone();
        let namespace = self.config.namespace.clone();
        let category = category.to_string();
        let max_entries = config.max_entries;

        self.supervisor.spawn("transient-cleanup", async move {
            Self::cleanup(cleanup_conn, namespace, category, max_entries).await
        });

        Ok(())
    }

    async fn delete(&self, category: &str, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.connection.clone();

        let removed: usize = conn
            .del(self.value_key(category, key))
            .await
            .map_err(|e| Self::storage_error("DEL", e))?;

        let _: () = conn
            .zrem(self.index_key(category), key)
            .await
            .map_err(|e| Self::storage_error("ZREM", e))?;

        Ok(removed > 0)
    }

    async fn clear(&self, category: &str) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();

        let members: Vec<String> = conn
            .zrange(self.index_key(category), 0, -1)
            .await
            .map_err(|e| Self::storage_error("ZRANGE", e))?;

        for member in members {
            let _: () = conn
                .del(self.value_key(category, &member))
                .await
                .map_err(|e| Self::storage_error("DEL", e))?;
        }

        let _: () = conn
            .del(self.index_key(category))
            .await
            .map_err(|e| Self::storage_error("DEL", e))?;
        let _: () = conn
            .del(self.seq_key(category))
            .await
            .map_err(|e| Self::storage_error("DEL", e))?;

        Ok(())
    }

    async fn invalidate_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        let pattern = format!("{}:*", self.config.namespace);
        let namespace_prefix = format!("{}:", self.config.namespace);

        let mut conn = self.connection.clone();

        // SCAN instead of KEYS: bounded work per round trip.
        let mut cursor = 0u64;
        let mut matching: Vec<(String, String)> = Vec::new();

        loop {
            let (new_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await
                .map_err(|e| Self::storage_error("SCAN", e))?;

            for full_key in keys {
                let Some(rest) = full_key.strip_prefix(&namespace_prefix) else {
                    continue;
                };
                let Some((category, logical_key)) = rest.split_once(':') else {
                    continue;
                };

                // Skip the per-category bookkeeping keys.
                if logical_key.starts_with("__") {
                    continue;
                }

                if logical_key.starts_with(prefix) {
                    matching.push((category.to_string(), logical_key.to_string()));
                }
            }

            cursor = new_cursor;

            if cursor == 0 {
                break;
            }
        }

        let mut deleted = 0;

        for (category, key) in matching {
            if self.delete(&category, &key).await? {
                deleted += 1;
            }
        }

        Ok(deleted)
    }

    async fn keys(&self, category: &str) -> Result<Vec<String>, CacheError> {
        let mut conn = self.connection.clone();

        let members: Vec<String> = conn
            .zrange(self.index_key(category), 0, -1)
            .await
            .map_err(|e| Self::storage_error("ZRANGE", e))?;

        let mut keys = Vec::with_capacity(members.len());

        for member in members {
            let exists: bool = conn
                .exists(self.value_key(category, &member))
                .await
                .map_err(|e| Self::storage_error("EXISTS", e))?;

            if exists {
                keys.push(member);
            }
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = RedisTransientConfig::default();
        assert_eq!(config.namespace, "gencache");
    }

    #[test]
    fn test_config_builder() {
        let config = RedisTransientConfig::new("redis://cache:6379").with_namespace("lessons");

        assert_eq!(config.url, "redis://cache:6379");
        assert_eq!(config.namespace, "lessons");
    }

    #[test]
    fn test_key_layout() {
        let config = RedisTransientConfig::default().with_namespace("ns");

        assert_eq!(
            format!("{}:{}:{}", config.namespace, "quiz", "k1"),
            "ns:quiz:k1"
        );
    }
}
