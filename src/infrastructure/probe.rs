//! Startup persistence-capability probe
//!
//! Some runtimes cannot reach the blob tier at all (restricted network,
//! cross-origin storage rules). Instead of classifying individual write
//! failures after the fact, the engine probes the blob store once at startup
//! and carries the result; the orchestrator consults it before attempting
//! binary persistence.

use uuid::Uuid;

use bytes::Bytes;
use tracing::{info, warn};

use crate::domain::blob::BlobStore;

/// Whether the binary/durable persistence path is usable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceCapability {
    /// Blob writes work; misses are persisted normally
    Full,
    /// Blob tier unreachable; generated media is returned uncached
    Limited,
}

/// How the engine decides its persistence capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceMode {
    /// Probe the blob store once at startup
    #[default]
    Auto,
    /// Assume the blob tier works; write failures surface as errors
    Full,
    /// Force degraded mode; media is never persisted
    Limited,
}

/// Resolves the engine's capability, probing when the mode is `Auto`
pub async fn resolve_capability(
    mode: PersistenceMode,
    blob_store: &dyn BlobStore,
) -> PersistenceCapability {
    match mode {
        PersistenceMode::Full => PersistenceCapability::Full,
        PersistenceMode::Limited => {
            info!("persistence forced to limited by configuration");
            PersistenceCapability::Limited
        }
        PersistenceMode::Auto => probe_blob_store(blob_store).await,
    }
}

/// Round-trips a tiny object through the blob store
///
/// Any failure marks the capability as limited; the probe never errors.
pub async fn probe_blob_store(blob_store: &dyn BlobStore) -> PersistenceCapability {
    let path = format!("__probe__/{}.bin", Uuid::new_v4());

    let outcome = async {
        blob_store
            .put(&path, Bytes::from_static(b"probe"), "application/octet-stream")
            .await?;
        blob_store.delete(&path).await?;
        Ok::<(), crate::domain::CacheError>(())
    }
    .await;

    match outcome {
        Ok(()) => {
            info!("blob store probe succeeded; persistence capability is full");
            PersistenceCapability::Full
        }
        Err(error) => {
            warn!(%error, "blob store probe failed; running with limited persistence");
            PersistenceCapability::Limited
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::blob::mock::MockBlobStore;

    #[tokio::test]
    async fn test_probe_full_on_working_store() {
        let store = MockBlobStore::new();

        let capability = probe_blob_store(&store).await;
        assert_eq!(capability, PersistenceCapability::Full);

        // The probe cleans up after itself.
        assert_eq!(store.object_count(), 0);
    }

    #[tokio::test]
    async fn test_probe_limited_on_failing_store() {
        let store = MockBlobStore::new().with_error("blocked by runtime");

        let capability = probe_blob_store(&store).await;
        assert_eq!(capability, PersistenceCapability::Limited);
    }

    #[tokio::test]
    async fn test_mode_overrides_skip_probe() {
        // A failing store is irrelevant when the mode is forced.
        let store = MockBlobStore::new().with_error("blocked");

        assert_eq!(
            resolve_capability(PersistenceMode::Full, &store).await,
            PersistenceCapability::Full
        );
        assert_eq!(
            resolve_capability(PersistenceMode::Limited, &store).await,
            PersistenceCapability::Limited
        );
    }
}
