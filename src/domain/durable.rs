//! Durable-tier store trait definition

use std::fmt::Debug;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::CacheError;
use crate::domain::entry::DurableEntry;

/// Shared, cross-device document store of generated content
///
/// The lookup key is the exact pair `(category, prompt)`; `topic` is kept
/// as metadata only. Callers that need topic-scoped uniqueness must fold
/// the topic into the prompt text.
///
/// Retention here is unbounded: this tier never expires entries.
#[async_trait]
pub trait DurableStore: Send + Sync + Debug {
    /// Returns the first entry matching `(category, prompt)`, if any
    ///
    /// When duplicates exist (concurrent misses both inserted), which one
    /// is returned is unspecified.
    async fn lookup(&self, category: &str, prompt: &str)
    -> Result<Option<DurableEntry>, CacheError>;

    /// Appends an entry without checking for existing duplicates
    async fn insert(&self, entry: DurableEntry) -> Result<(), CacheError>;

    /// Atomically increments the view counter of one entry
    async fn increment_views(&self, id: &Uuid) -> Result<(), CacheError>;
}

#[cfg(test)]
pub mod mock {
    use std::sync::Mutex;

    use super::*;

    /// Mock durable store for testing
    #[derive(Debug, Default)]
    pub struct MockDurableStore {
        entries: Mutex<Vec<DurableEntry>>,
        error: Mutex<Option<String>>,
    }

    impl MockDurableStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_entry(self, entry: DurableEntry) -> Self {
            self.entries.lock().unwrap().push(entry);
            self
        }

        pub fn with_error(self, error: impl Into<String>) -> Self {
            *self.error.lock().unwrap() = Some(error.into());
            self
        }

        /// Number of stored entries, for asserting on persistence behavior
        pub fn entry_count(&self) -> usize {
            self.entries.lock().unwrap().len()
        }

        fn check_error(&self) -> Result<(), CacheError> {
            if let Some(error) = self.error.lock().unwrap().clone() {
                return Err(CacheError::storage(error));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl DurableStore for MockDurableStore {
        async fn lookup(
            &self,
            category: &str,
            prompt: &str,
        ) -> Result<Option<DurableEntry>, CacheError> {
            self.check_error()?;
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .find(|e| e.category == category && e.prompt == prompt)
                .cloned())
        }

        async fn insert(&self, entry: DurableEntry) -> Result<(), CacheError> {
            self.check_error()?;
            self.entries.lock().unwrap().push(entry);
            Ok(())
        }

        async fn increment_views(&self, id: &Uuid) -> Result<(), CacheError> {
            self.check_error()?;
            let mut entries = self.entries.lock().unwrap();

            if let Some(entry) = entries.iter_mut().find(|e| &e.id == id) {
                entry.views += 1;
            }

            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_lookup_first_match() {
            let store = MockDurableStore::new()
                .with_entry(DurableEntry::inline(
                    "quiz",
                    "gravity",
                    "make a quiz",
                    serde_json::json!({"v": 1}),
                ))
                .with_entry(DurableEntry::inline(
                    "quiz",
                    "gravity",
                    "make a quiz",
                    serde_json::json!({"v": 2}),
                ));

            let hit = store.lookup("quiz", "make a quiz").await.unwrap().unwrap();
            assert_eq!(
                hit.payload,
                crate::domain::entry::DurablePayload::Inline {
                    content: serde_json::json!({"v": 1})
                }
            );
        }

        #[tokio::test]
        async fn test_mock_increment_views() {
            let entry =
                DurableEntry::inline("quiz", "gravity", "make a quiz", serde_json::json!({}));
            let id = entry.id;
            let store = MockDurableStore::new().with_entry(entry);

            store.increment_views(&id).await.unwrap();
            store.increment_views(&id).await.unwrap();

            let hit = store.lookup("quiz", "make a quiz").await.unwrap().unwrap();
            assert_eq!(hit.views, 2);
        }
    }
}
