//! Per-session turn locks.
//!
//! Handlers load a copy of the state, await the LLM, then write it back.
//! Two writers on the same session must not overlap or the later `put`
//! silently discards the earlier one, so every handler that mutates a
//! session holds that session's lock from `get` to `put`.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::domain::foundation::SessionId;

/// Registry of one async mutex per active session.
///
/// Cloning shares the registry, so handlers built from the same
/// `SessionLocks` serialize against each other.
#[derive(Debug, Clone, Default)]
pub struct SessionLocks {
    inner: Arc<RwLock<HashMap<SessionId, Arc<Mutex<()>>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other operation holds `session_id`.
    pub async fn acquire(&self, session_id: SessionId) -> OwnedMutexGuard<()> {
        let existing = self.inner.read().await.get(&session_id).cloned();
        let lock = match existing {
            Some(lock) => lock,
            None => self
                .inner
                .write()
                .await
                .entry(session_id)
                .or_default()
                .clone(),
        };
        lock.lock_owned().await
    }

    /// Drops the entry for `session_id` if nobody holds or awaits it.
    pub async fn release(&self, session_id: SessionId) {
        let mut locks = self.inner.write().await;
        if locks
            .get(&session_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&session_id);
        }
    }

    /// Number of sessions with a live entry.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_session_waits_for_holder() {
        let locks = SessionLocks::new();
        let id = SessionId::new();

        let guard = locks.acquire(id).await;
        let waiting = tokio::time::timeout(Duration::from_millis(20), locks.acquire(id)).await;
        assert!(waiting.is_err());

        drop(guard);
        let reacquired = tokio::time::timeout(Duration::from_millis(20), locks.acquire(id)).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn different_sessions_do_not_block() {
        let locks = SessionLocks::new();

        let _first = locks.acquire(SessionId::new()).await;
        let second =
            tokio::time::timeout(Duration::from_millis(20), locks.acquire(SessionId::new())).await;

        assert!(second.is_ok());
        assert_eq!(locks.len().await, 2);
    }

    #[tokio::test]
    async fn release_keeps_held_entries() {
        let locks = SessionLocks::new();
        let id = SessionId::new();

        let guard = locks.acquire(id).await;
        locks.release(id).await;
        assert_eq!(locks.len().await, 1);

        drop(guard);
        locks.release(id).await;
        assert!(locks.is_empty().await);
    }

    #[tokio::test]
    async fn clones_share_the_registry() {
        let locks = SessionLocks::new();
        let shared = locks.clone();
        let id = SessionId::new();

        let _guard = locks.acquire(id).await;
        let waiting = tokio::time::timeout(Duration::from_millis(20), shared.acquire(id)).await;

        assert!(waiting.is_err());
    }
}
