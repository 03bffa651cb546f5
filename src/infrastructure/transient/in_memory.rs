//! In-memory transient store

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::domain::CacheError;
use crate::domain::category::CategoryConfig;
use crate::domain::transient::TransientStore;
use crate::infrastructure::supervisor::TaskSupervisor;

#[derive(Debug, Clone)]
struct TransientRecord {
    data: String,
    /// Millis since epoch; `None` means no TTL
    expires_at: Option<u64>,
    /// Monotonic insertion order within the partition
    seq: u64,
}

#[derive(Debug, Default)]
struct Partition {
    entries: HashMap<String, TransientRecord>,
    next_seq: u64,
}

type Partitions = Arc<RwLock<HashMap<String, Partition>>>;

/// Thread-safe in-memory transient store partitioned by category
///
/// Expiration is checked lazily on read; no background timer sweeps the
/// store. After every put, a supervised cleanup task deletes expired
/// entries and then trims the category to its `max_entries` most recently
/// inserted records.
#[derive(Debug, Default)]
pub struct InMemoryTransientStore {
    partitions: Partitions,
    supervisor: TaskSupervisor,
}

impl InMemoryTransientStore {
    pub fn new(supervisor: TaskSupervisor) -> Self {
        Self {
            partitions: Arc::new(RwLock::new(HashMap::new())),
            supervisor,
        }
    }

    fn current_time_millis() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    fn is_expired(record: &TransientRecord, now: u64) -> bool {
        record.expires_at.is_some_and(|at| at <= now)
    }

    fn read_lock_error<E: std::fmt::Display>(e: E) -> CacheError {
        CacheError::storage(format!("Failed to acquire read lock: {}", e))
    }

    fn write_lock_error<E: std::fmt::Display>(e: E) -> CacheError {
        CacheError::storage(format!("Failed to acquire write lock: {}", e))
    }

    /// Two-phase cleanup: drop expired entries, then trim to capacity by
    /// insertion order. Runs as a supervised task after every put.
    fn cleanup(
        partitions: &Partitions,
        category: &str,
        config: &CategoryConfig,
    ) -> Result<(), CacheError> {
        let now = Self::current_time_millis();
        let mut map = partitions.write().map_err(Self::write_lock_error)?;

        let Some(partition) = map.get_mut(category) else {
            return Ok(());
        };

        partition
            .entries
            .retain(|_, record| !Self::is_expired(record, now));

        if partition.entries.len() > config.max_entries {
            if config.max_entries == 0 {
                partition.entries.clear();
            } else {
                let mut seqs: Vec<u64> = partition.entries.values().map(|r| r.seq).collect();
                seqs.sort_unstable_by(|a, b| b.cmp(a));
                let cutoff = seqs[config.max_entries - 1];

                partition.entries.retain(|_, record| record.seq >= cutoff);
            }
        }

        Ok(())
    }
}

#[async_trait]
impl TransientStore for InMemoryTransientStore {
    async fn get_raw(&self, category: &str, key: &str) -> Result<Option<String>, CacheError> {
        let now = Self::current_time_millis();

        let expired = {
            let map = self.partitions.read().map_err(Self::read_lock_error)?;

            match map.get(category).and_then(|p| p.entries.get(key)) {
                None => return Ok(None),
                Some(record) if !Self::is_expired(record, now) => {
                    return Ok(Some(record.data.clone()));
                }
                Some(_) => true,
            }
        };

        // Expired hit: delete opportunistically and report absent.
        if expired {
            let mut map = self.partitions.write().map_err(Self::write_lock_error)?;
            if let Some(partition) = map.get_mut(category) {
                partition.entries.remove(key);
            }
        }

        Ok(None)
    }

    async fn put_raw(
        &self,
        category: &str,
        key: &str,
        value: &str,
        config: &CategoryConfig,
    ) -> Result<(), CacheError> {
        let now = Self::current_time_millis();

        {
            let mut map = self.partitions.write().map_err(Self::write_lock_error)?;
            let partition = map.entry(category.to_string()).or_default();

            let seq = partition.next_seq;
            partition.next_seq += 1;

            partition.entries.insert(
                key.to_string(),
                TransientRecord {
                    data: value.to_string(),
                    expires_at: config
                        .max_age
                        .map(|max_age| now + max_age.as_millis() as u64),
                    seq,
                },
            );
        }

        // Scheduled strictly after the write completes; not awaited here.
        let partitions = self.partitions.clone();
        let category = category.to_string();
        let config = config.clone();

        self.supervisor.spawn("transient-cleanup", async move {
            Self::cleanup(&partitions, &category, &config)
        });

        Ok(())
    }

    async fn delete(&self, category: &str, key: &str) -> Result<bool, CacheError> {
        let mut map = self.partitions.write().map_err(Self::write_lock_error)?;

        Ok(map
            .get_mut(category)
            .is_some_and(|p| p.entries.remove(key).is_some()))
    }

    async fn clear(&self, category: &str) -> Result<(), CacheError> {
        let mut map = self.partitions.write().map_err(Self::write_lock_error)?;
        map.remove(category);
        Ok(())
    }

    async fn invalidate_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        let mut map = self.partitions.write().map_err(Self::write_lock_error)?;
        let mut deleted = 0;

        for partition in map.values_mut() {
            let before = partition.entries.len();
            partition.entries.retain(|key, _| !key.starts_with(prefix));
            deleted += before - partition.entries.len();
        }

        Ok(deleted)
    }

    async fn keys(&self, category: &str) -> Result<Vec<String>, CacheError> {
        let now = Self::current_time_millis();
        let map = self.partitions.read().map_err(Self::read_lock_error)?;

        Ok(map
            .get(category)
            .map(|p| {
                p.entries
                    .iter()
                    .filter(|(_, record)| !Self::is_expired(record, now))
                    .map(|(key, _)| key.clone())
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::transient::TransientStoreExt;

    fn store() -> InMemoryTransientStore {
        InMemoryTransientStore::new(TaskSupervisor::new())
    }

    fn config() -> CategoryConfig {
        CategoryConfig::new(Some(Duration::from_secs(60)), 100)
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = store();

        store.put("quiz", "k1", &"v1", &config()).await.unwrap();

        let value: Option<String> = store.get("quiz", "k1").await.unwrap();
        assert_eq!(value, Some("v1".to_string()));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = store();

        let value: Option<String> = store.get("quiz", "missing").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_categories_are_isolated() {
        let store = store();

        store.put("quiz", "k1", &"quiz", &config()).await.unwrap();
        store
            .put("progress", "k1", &"progress", &config())
            .await
            .unwrap();

        let value: Option<String> = store.get("quiz", "k1").await.unwrap();
        assert_eq!(value, Some("quiz".to_string()));

        store.clear("quiz").await.unwrap();

        let gone: Option<String> = store.get("quiz", "k1").await.unwrap();
        let kept: Option<String> = store.get("progress", "k1").await.unwrap();
        assert!(gone.is_none());
        assert_eq!(kept, Some("progress".to_string()));
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let store = store();
        let short = CategoryConfig::new(Some(Duration::from_millis(10)), 100);

        store.put("quiz", "k1", &"v1", &short).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;

        let value: Option<String> = store.get("quiz", "k1").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_deleted_on_read() {
        let store = store();
        let short = CategoryConfig::new(Some(Duration::from_millis(10)), 100);

        store.put("quiz", "k1", &"v1", &short).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        let _: Option<String> = store.get("quiz", "k1").await.unwrap();

        // Physically removed, not just hidden.
        let map = store.partitions.read().unwrap();
        assert!(!map.get("quiz").unwrap().entries.contains_key("k1"));
    }

    #[tokio::test]
    async fn test_no_max_age_means_no_expiry() {
        let store = store();
        let unbounded = CategoryConfig::new(None, 100);

        store.put("quiz", "k1", &"v1", &unbounded).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let value: Option<String> = store.get("quiz", "k1").await.unwrap();
        assert_eq!(value, Some("v1".to_string()));
    }

    #[tokio::test]
    async fn test_capacity_eviction_keeps_most_recently_inserted() {
        let supervisor = TaskSupervisor::new();
        let store = InMemoryTransientStore::new(supervisor.clone());
        let capped = CategoryConfig::new(None, 3);

        for key in ["a", "b", "c", "d", "e"] {
            store.put("quiz", key, &key, &capped).await.unwrap();
        }

        supervisor.wait_idle().await;

        let mut survivors = store.keys("quiz").await.unwrap();
        survivors.sort();
        assert_eq!(survivors, vec!["c", "d", "e"]);
    }

    #[tokio::test]
    async fn test_rewrite_refreshes_insertion_order() {
        let supervisor = TaskSupervisor::new();
        let store = InMemoryTransientStore::new(supervisor.clone());
        let capped = CategoryConfig::new(None, 2);

        store.put("quiz", "a", &1, &capped).await.unwrap();
        store.put("quiz", "b", &1, &capped).await.unwrap();
        // Rewriting "a" makes it the most recently inserted entry.
        store.put("quiz", "a", &2, &capped).await.unwrap();
        store.put("quiz", "c", &1, &capped).await.unwrap();

        supervisor.wait_idle().await;

        let mut survivors = store.keys("quiz").await.unwrap();
        survivors.sort();
        assert_eq!(survivors, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_prefix_invalidation_spans_categories() {
        let store = store();

        store.put("quiz", "u1_a", &1, &config()).await.unwrap();
        store.put("quiz", "u1_b", &2, &config()).await.unwrap();
        store.put("progress", "u2_a", &3, &config()).await.unwrap();

        let deleted = store.invalidate_prefix("u1_").await.unwrap();
        assert_eq!(deleted, 2);

        assert_eq!(store.keys("quiz").await.unwrap().len(), 0);
        assert_eq!(store.keys("progress").await.unwrap(), vec!["u2_a"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = store();

        store.put("quiz", "k1", &"v1", &config()).await.unwrap();

        assert!(store.delete("quiz", "k1").await.unwrap());
        assert!(!store.delete("quiz", "k1").await.unwrap());
    }

    #[tokio::test]
    async fn test_len_counts_survivors() {
        let store = store();

        store.put("quiz", "k1", &1, &config()).await.unwrap();
        store.put("quiz", "k2", &2, &config()).await.unwrap();

        assert_eq!(store.len("quiz").await.unwrap(), 2);
    }
}
