use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use super::ChatSession;

/// A session guarded by its own lock, so one session's interactions are
/// serialized without blocking other sessions.
pub type SharedSession = Arc<Mutex<ChatSession>>;

const SWEEP_PERIOD: Duration = Duration::from_secs(60);

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> (Uuid, SharedSession) {
        let session = ChatSession::new();
        let id = session.id();
        let shared = Arc::new(Mutex::new(session));
        let mut guard = self.inner.write().await;
        guard.insert(id, shared.clone());
        (id, shared)
    }

    pub async fn get(&self, session_id: &Uuid) -> Option<SharedSession> {
        let guard = self.inner.read().await;
        guard.get(session_id).cloned()
    }

    pub async fn remove(&self, session_id: &Uuid) -> bool {
        let mut guard = self.inner.write().await;
        guard.remove(session_id).is_some()
    }

    /// Drop sessions idle for at least `ttl`. Sessions currently locked by a
    /// request are in use and always kept. Returns how many were dropped.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let mut guard = self.inner.write().await;
        let before = guard.len();
        guard.retain(|_, session| match session.try_lock() {
            Ok(session) => session.idle_for() < ttl,
            Err(_) => true,
        });
        before - guard.len()
    }

    /// Periodically evict sessions idle for longer than `ttl`.
    pub fn spawn_sweeper(&self, ttl: Duration) -> JoinHandle<()> {
        let store = self.clone();
        let period = ttl.min(SWEEP_PERIOD).max(Duration::from_secs(1));
        info!(ttl_secs = ttl.as_secs(), "Idle session expiry enabled");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle(ttl).await;
                if evicted > 0 {
                    let remaining = store.len().await;
                    info!(evicted, remaining, "Expired idle sessions");
                } else {
                    debug!("No idle sessions to expire");
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ChatMessage;

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let (first_id, first) = store.create().await;
        let (second_id, _) = store.create().await;
        assert_ne!(first_id, second_id);
        assert_eq!(store.len().await, 2);

        first.lock().await.push(ChatMessage::user("only in first"));

        let second = store.get(&second_id).await.unwrap();
        assert!(second.lock().await.transcript().is_empty());
        let first_again = store.get(&first_id).await.unwrap();
        assert_eq!(first_again.lock().await.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_and_removed_sessions() {
        let store = SessionStore::new();
        assert!(store.get(&Uuid::new_v4()).await.is_none());

        let (id, _) = store.create().await;
        assert!(store.remove(&id).await);
        assert!(!store.remove(&id).await);
        assert!(store.get(&id).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_idle_sessions_are_evicted() {
        let store = SessionStore::new();
        let (idle_id, _) = store.create().await;
        let (active_id, active) = store.create().await;

        tokio::time::sleep(Duration::from_millis(200)).await;
        active.lock().await.touch();

        assert_eq!(store.evict_idle(Duration::from_millis(100)).await, 1);
        assert!(store.get(&idle_id).await.is_none());
        assert!(store.get(&active_id).await.is_some());
    }

    #[tokio::test]
    async fn test_busy_session_survives_eviction() {
        let store = SessionStore::new();
        let (id, session) = store.create().await;
        let _in_use = session.lock().await;

        assert_eq!(store.evict_idle(Duration::ZERO).await, 0);
        assert!(store.get(&id).await.is_some());
    }

    #[tokio::test]
    async fn test_sweeper_removes_abandoned_sessions() {
        let store = SessionStore::new();
        for _ in 0..3 {
            store.create().await;
        }

        let sweeper = store.spawn_sweeper(Duration::from_millis(50));
        tokio::time::sleep(Duration::from_millis(1500)).await;
        sweeper.abort();

        assert!(store.is_empty().await);
    }
}
