//! In-memory durable store implementation

use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::CacheError;
use crate::domain::durable::DurableStore;
use crate::domain::entry::DurableEntry;

/// Thread-safe in-memory durable store
///
/// Append-only list, first match wins. Useful for testing and development;
/// data is lost when the process terminates.
#[derive(Debug, Default)]
pub struct InMemoryDurableStore {
    entries: RwLock<Vec<DurableEntry>>,
}

impl InMemoryDurableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with entries
    pub fn with_entries(entries: Vec<DurableEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_lock_error<E: std::fmt::Display>(e: E) -> CacheError {
        CacheError::storage(format!("Failed to acquire read lock: {}", e))
    }

    fn write_lock_error<E: std::fmt::Display>(e: E) -> CacheError {
        CacheError::storage(format!("Failed to acquire write lock: {}", e))
    }
}

#[async_trait]
impl DurableStore for InMemoryDurableStore {
    async fn lookup(
        &self,
        category: &str,
        prompt: &str,
    ) -> Result<Option<DurableEntry>, CacheError> {
        let entries = self.entries.read().map_err(Self::read_lock_error)?;

        Ok(entries
            .iter()
            .find(|e| e.category == category && e.prompt == prompt)
            .cloned())
    }

    async fn insert(&self, entry: DurableEntry) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(Self::write_lock_error)?;
        entries.push(entry);
        Ok(())
    }

    async fn increment_views(&self, id: &Uuid) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(Self::write_lock_error)?;

        if let Some(entry) = entries.iter_mut().find(|e| &e.id == id) {
            entry.views += 1;
        }

        Ok(())
    }
}
