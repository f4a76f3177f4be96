//! # Store Session Guard
//!
//! Async wrapper around [`harbor_core::session`]: loads the user's store
//! access and the session state, runs the transition, and persists the new
//! state when it changed.
//!
//! ```text
//! request ──► load access + state ──► core transition ──► save (if changed)
//!                                                 │
//!                                                 ▼
//!                                   Proceed / Redirect / Acknowledged
//!                                   Rejected ──► Err(StoreAccessDenied)
//! ```

use std::sync::Arc;
use tracing::{debug, info, warn};

use harbor_core::session::{self, GuardEffect, SessionState, StoreAccess, Transition};

use crate::error::{BackofficeError, BackofficeResult};
use crate::ports::{SessionStore, StoreDirectory};

pub struct StoreSessionGuard {
    directory: Arc<dyn StoreDirectory>,
    sessions: Arc<dyn SessionStore>,
}

impl StoreSessionGuard {
    pub fn new(directory: Arc<dyn StoreDirectory>, sessions: Arc<dyn SessionStore>) -> Self {
        StoreSessionGuard {
            directory,
            sessions,
        }
    }

    /// Gate for store-scoped requests.
    ///
    /// Returns `Proceed` with the active store, or `RedirectToSelection`.
    /// A selection that is no longer valid is cleared from the session.
    pub async fn ensure_active_store(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> BackofficeResult<GuardEffect> {
        let state = self.sessions.load(session_id).await?;
        if state == SessionState::NoStoreSelected {
            return Ok(GuardEffect::RedirectToSelection);
        }

        let access = self.directory.store_access(user_id).await?;
        let transition = session::ensure_active_store(&access, &state);

        if transition.state != state {
            warn!(
                user_id = %user_id,
                session_id = %session_id,
                stale_store = ?state.active_store_id(),
                "Active store no longer available, clearing selection"
            );
        }

        self.commit(session_id, &state, transition).await
    }

    /// First pick from the store selection view.
    pub async fn select_store(
        &self,
        user_id: &str,
        session_id: &str,
        store_id: &str,
    ) -> BackofficeResult<GuardEffect> {
        let (access, state) = self.load(user_id, session_id).await?;
        let transition = session::select_store(&access, store_id);
        self.finish(user_id, session_id, &state, transition).await
    }

    /// Moves an established session to another store.
    ///
    /// A refused switch leaves the current store selected.
    pub async fn switch_store(
        &self,
        user_id: &str,
        session_id: &str,
        store_id: &str,
    ) -> BackofficeResult<GuardEffect> {
        let (access, state) = self.load(user_id, session_id).await?;
        let transition = session::switch_store(&access, &state, store_id);
        self.finish(user_id, session_id, &state, transition).await
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    async fn load(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> BackofficeResult<(StoreAccess, SessionState)> {
        let access = self.directory.store_access(user_id).await?;
        let state = self.sessions.load(session_id).await?;
        Ok((access, state))
    }

    /// Persists the transition, then turns a rejection into an error.
    async fn finish(
        &self,
        user_id: &str,
        session_id: &str,
        previous: &SessionState,
        transition: Transition,
    ) -> BackofficeResult<GuardEffect> {
        match self.commit(session_id, previous, transition).await? {
            GuardEffect::Rejected { store_id, reason } => {
                warn!(
                    user_id = %user_id,
                    store_id = %store_id,
                    %reason,
                    "Store selection refused"
                );
                Err(BackofficeError::StoreAccessDenied { store_id, reason })
            }
            effect => {
                if let GuardEffect::Acknowledged { store_id } = &effect {
                    info!(user_id = %user_id, store_id = %store_id, "Active store set");
                }
                Ok(effect)
            }
        }
    }

    async fn commit(
        &self,
        session_id: &str,
        previous: &SessionState,
        transition: Transition,
    ) -> BackofficeResult<GuardEffect> {
        if &transition.state != previous {
            debug!(session_id = %session_id, state = ?transition.state, "Saving session state");
            self.sessions.save(session_id, transition.state).await?;
        }
        Ok(transition.effect)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
