//! Durable-tier entry types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Durable pointer into the blob tier
///
/// The referenced object has its own lifecycle: deleting the durable
/// document does not cascade into the blob store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobReference {
    /// Blob path within the store (e.g. `narrated-audio/1a2b3c4d.mp3`)
    pub key: String,
    /// Stable retrieval URL
    pub url: String,
    /// MIME type of the stored object
    pub mime_type: String,
}

/// Payload stored in a durable entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DurablePayload {
    /// Inline JSON content (explanatory text, quiz items, ...)
    Inline { content: serde_json::Value },
    /// Reference to a binary artifact in the blob tier
    Blob { reference: BlobReference },
}

/// One cached generation result in the shared, cross-device tier
///
/// Entries are created on cache miss and never mutated in place beyond the
/// view-count increment; content updates are replace-by-key. This tier never
/// expires entries: it is the system of record, while the transient tier is
/// a disposable accelerator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurableEntry {
    pub id: Uuid,
    pub category: String,
    /// Stored as metadata only; not part of the lookup key.
    pub topic: String,
    pub prompt: String,
    pub payload: DurablePayload,
    pub created_at: DateTime<Utc>,
    pub creator_id: Option<String>,
    pub views: i64,
}

impl DurableEntry {
    /// Creates a new entry with an inline payload
    pub fn inline(
        category: impl Into<String>,
        topic: impl Into<String>,
        prompt: impl Into<String>,
        content: serde_json::Value,
    ) -> Self {
        Self::new(
            category,
            topic,
            prompt,
            DurablePayload::Inline { content },
        )
    }

    /// Creates a new entry pointing at a stored blob
    pub fn blob(
        category: impl Into<String>,
        topic: impl Into<String>,
        prompt: impl Into<String>,
        reference: BlobReference,
    ) -> Self {
        Self::new(category, topic, prompt, DurablePayload::Blob { reference })
    }

    fn new(
        category: impl Into<String>,
        topic: impl Into<String>,
        prompt: impl Into<String>,
        payload: DurablePayload,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: category.into(),
            topic: topic.into(),
            prompt: prompt.into(),
            payload,
            created_at: Utc::now(),
            creator_id: None,
            views: 0,
        }
    }

    pub fn with_creator(mut self, creator_id: impl Into<String>) -> Self {
        self.creator_id = Some(creator_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_entry() {
        let entry = DurableEntry::inline(
            "lesson-text",
            "gravity",
            "explain gravity",
            serde_json::json!({"body": "Things fall."}),
        );

        assert_eq!(entry.views, 0);
        assert!(entry.creator_id.is_none());
        assert!(matches!(entry.payload, DurablePayload::Inline { .. }));
    }

    #[test]
    fn test_blob_entry_with_creator() {
        let reference = BlobReference {
            key: "narrated-audio/1a2b3c4d.mp3".to_string(),
            url: "https://cdn.example/narrated-audio/1a2b3c4d.mp3".to_string(),
            mime_type: "audio/mpeg".to_string(),
        };

        let entry = DurableEntry::blob("narrated-audio", "gravity", "narrate gravity", reference)
            .with_creator("u1");

        assert_eq!(entry.creator_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_payload_round_trips_through_json() {
        let payload = DurablePayload::Blob {
            reference: BlobReference {
                key: "scene-video/ff00aa11.mp4".to_string(),
                url: "mem://scene-video/ff00aa11.mp4".to_string(),
                mime_type: "video/mp4".to_string(),
            },
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "blob");

        let back: DurablePayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
    }
}
