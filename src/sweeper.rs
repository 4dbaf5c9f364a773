//! Periodic removal of expired sessions
//!
//! Expired sessions already fail to resolve; the sweeper only reclaims the
//! space they occupy in stores without native TTL (memory, Postgres).

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::store::SessionStore;

/// Background task calling [`SessionStore::cleanup_expired`] on an interval
pub struct ExpirySweeper<S: SessionStore> {
    store: Arc<S>,
    interval: Duration,
}

impl<S: SessionStore> ExpirySweeper<S> {
    /// Create a sweeper over a shared store
    pub fn new(store: Arc<S>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Run one sweep, returning how many sessions were removed
    pub async fn sweep_once(&self) -> usize {
        tracing::debug!("session_sweep: start");
        match self.store.cleanup_expired().await {
            Ok(count) => {
                if count > 0 {
                    tracing::info!(cleaned = count, "session_sweep: done");
                }
                count
            }
            Err(e) => {
                tracing::error!(error = %e, "session_sweep failed");
                0
            }
        }
    }

    /// Sweep forever on the configured interval
    ///
    /// The first sweep runs immediately. Abort the returned handle to stop.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.sweep_once().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::AdminSession;
    use crate::store::testing::UnreachableStore;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_sweep_once_removes_expired() {
        let store = Arc::new(MemoryStore::new());
        let live = AdminSession::new("admin-1", 3600);
        store.create(&live).await.unwrap();
        store.create(&AdminSession::new("admin-2", 0)).await.unwrap();
        store.create(&AdminSession::new("admin-3", 0)).await.unwrap();

        let sweeper = ExpirySweeper::new(Arc::clone(&store), Duration::from_secs(60));
        assert_eq!(sweeper.sweep_once().await, 2);
        assert_eq!(sweeper.sweep_once().await, 0);
        assert!(store.get(&live.token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sweep_failure_is_logged_not_raised() {
        let store = Arc::new(UnreachableStore::default());
        let sweeper = ExpirySweeper::new(Arc::clone(&store), Duration::from_secs(60));

        assert_eq!(sweeper.sweep_once().await, 0);
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_spawned_sweeper_runs_first_tick() {
        let store = Arc::new(UnreachableStore::default());

        let handle = ExpirySweeper::new(Arc::clone(&store), Duration::from_secs(3600)).spawn();
        for _ in 0..100 {
            if store.calls() > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert_eq!(store.calls(), 1);
    }
}
