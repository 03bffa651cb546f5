//! Transient-tier store trait definition

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::domain::CacheError;
use crate::domain::category::CategoryConfig;

/// Fast per-device cache, partitioned into named categories
///
/// This trait uses JSON strings internally to be dyn-compatible; the
/// [`TransientStoreExt`] helpers provide typed operations.
///
/// Semantics every implementation must preserve:
/// - `get` treats an entry past its expiry as absent and deletes it
///   opportunistically.
/// - After every `put`, a two-phase cleanup is scheduled asynchronously:
///   expired entries are deleted first, then, if the category still exceeds
///   `max_entries`, only the N most recently *inserted* entries survive.
///   Eviction recency is by write time, not last access.
#[async_trait]
pub trait TransientStore: Send + Sync + Debug {
    /// Gets a raw JSON value; absent if missing or expired
    async fn get_raw(&self, category: &str, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores a raw JSON value and schedules post-write cleanup
    async fn put_raw(
        &self,
        category: &str,
        key: &str,
        value: &str,
        config: &CategoryConfig,
    ) -> Result<(), CacheError>;

    /// Deletes one entry, returning whether it existed
    async fn delete(&self, category: &str, key: &str) -> Result<bool, CacheError>;

    /// Removes every entry in a category
    async fn clear(&self, category: &str) -> Result<(), CacheError>;

    /// Scans all categories and deletes keys with a matching string prefix,
    /// returning the number deleted. Used to purge all state for one owner.
    async fn invalidate_prefix(&self, prefix: &str) -> Result<usize, CacheError>;

    /// Lists the surviving keys in a category (expired entries excluded)
    async fn keys(&self, category: &str) -> Result<Vec<String>, CacheError>;

    /// Number of surviving entries in a category
    async fn len(&self, category: &str) -> Result<usize, CacheError> {
        Ok(self.keys(category).await?.len())
    }
}

/// Extension trait providing typed get/put operations
pub trait TransientStoreExt: TransientStore {
    /// Gets a typed value from the store
    fn get<'a, V>(
        &'a self,
        category: &'a str,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<Option<V>, CacheError>> + Send
    where
        V: DeserializeOwned + Send,
    {
        async move {
            match self.get_raw(category, key).await? {
                Some(data) => {
                    let value: V = serde_json::from_str(&data).map_err(|e| {
                        CacheError::serialization(format!(
                            "Failed to deserialize transient value: {}",
                            e
                        ))
                    })?;
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        }
    }

    /// Stores a typed value
    fn put<'a, V>(
        &'a self,
        category: &'a str,
        key: &'a str,
        value: &'a V,
        config: &'a CategoryConfig,
    ) -> impl std::future::Future<Output = Result<(), CacheError>> + Send
    where
        V: Serialize + Send + Sync,
    {
        async move {
            let data = serde_json::to_string(value).map_err(|e| {
                CacheError::serialization(format!("Failed to serialize transient value: {}", e))
            })?;
            self.put_raw(category, key, &data, config).await
        }
    }
}

// Blanket implementation for all types implementing TransientStore
impl<T: TransientStore + ?Sized> TransientStoreExt for T {}
