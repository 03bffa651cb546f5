//! Supervised background tasks
//!
//! Eviction sweeps and view-count increments run off the caller's path.
//! Instead of detached `tokio::spawn` calls that swallow errors, every
//! background task goes through the supervisor. Failure policy: errors are
//! logged at `warn` with the task name, counted, and never retried.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::sync::Notify;
use tracing::warn;

use crate::domain::CacheError;

/// Tracks in-flight background tasks and their failures
#[derive(Debug, Clone, Default)]
pub struct TaskSupervisor {
    active: Arc<AtomicUsize>,
    failures: Arc<AtomicU64>,
    notify: Arc<Notify>,
}

impl TaskSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a supervised background task
    ///
    /// Scheduled strictly after the caller's own write has completed; the
    /// caller does not await the result.
    pub fn spawn<F>(&self, task: &'static str, fut: F)
    where
        F: Future<Output = Result<(), CacheError>> + Send + 'static,
    {
        self.active.fetch_add(1, Ordering::SeqCst);

        let active = self.active.clone();
        let failures = self.failures.clone();
        let notify = self.notify.clone();

        tokio::spawn(async move {
            if let Err(error) = fut.await {
                failures.fetch_add(1, Ordering::SeqCst);
                warn!(task, %error, "background task failed");
            }

            active.fetch_sub(1, Ordering::SeqCst);
            notify.notify_waiters();
        });
    }

    /// Waits until no supervised task is in flight
    ///
    /// Lets tests observe post-write cleanup deterministically and lets the
    /// engine drain pending work on shutdown.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.notify.notified();

            if self.active.load(Ordering::SeqCst) == 0 {
                return;
            }

            notified.await;
        }
    }

    /// Number of tasks currently in flight
    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Number of tasks that have completed with an error
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_and_wait_idle() {
        let supervisor = TaskSupervisor::new();

        supervisor.spawn("noop", async { Ok(()) });
        supervisor.spawn("noop", async { Ok(()) });

        supervisor.wait_idle().await;
        assert_eq!(supervisor.active_count(), 0);
        assert_eq!(supervisor.failure_count(), 0);
    }

    #[tokio::test]
    async fn test_failures_are_counted_not_propagated() {
        let supervisor = TaskSupervisor::new();

        supervisor.spawn("failing", async { Err(CacheError::storage("boom")) });
        supervisor.wait_idle().await;

        assert_eq!(supervisor.failure_count(), 1);
    }

    #[tokio::test]
    async fn test_wait_idle_with_nothing_scheduled() {
        let supervisor = TaskSupervisor::new();
        supervisor.wait_idle().await;
    }
}
