//! In-process session storage.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use harbor_core::session::SessionState;

use crate::error::BackofficeResult;
use crate::ports::SessionStore;

/// Session state keyed by session id, held in memory.
///
/// Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionState>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Forgets a session, e.g. on logout.
    pub async fn remove(&self, session_id: &str) -> Option<SessionState> {
        self.sessions.write().await.remove(session_id)
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, session_id: &str) -> BackofficeResult<SessionState> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned().unwrap_or_default())
    }

    async fn save(&self, session_id: &str, state: SessionState) -> BackofficeResult<()> {
        self.sessions
            .write()
            .await
            .insert(session_id.to_string(), state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_session_has_no_store() {
        let store = MemorySessionStore::new();
        assert_eq!(store.load("sess-1").await.unwrap(), SessionState::NoStoreSelected);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemorySessionStore::new();
        let other = store.clone();

        store.save("sess-1", SessionState::selected("s1")).await.unwrap();
        assert_eq!(other.load("sess-1").await.unwrap(), SessionState::selected("s1"));

        assert_eq!(other.remove("sess-1").await, Some(SessionState::selected("s1")));
        assert_eq!(store.len().await, 0);
    }
}
