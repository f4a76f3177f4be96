//! # Store Session State Machine
//!
//! Which store a back-office session is working in, and whether it may.
//!
//! ## States & Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌───────────────────┐   select(id) ✓    ┌───────────────────────┐    │
//! │   │  NoStoreSelected  │ ─────────────────►│  StoreSelected(id)    │    │
//! │   │                   │◄───────────────── │                       │    │
//! │   └───────────────────┘  ensure ✗ (stale) └───────────────────────┘    │
//! │     │        ▲                               │         ▲               │
//! │     │select ✗│                               │switch ✓ │ switch ✗      │
//! │     └────────┘                               └─────────┘ (unchanged)    │
//! │                                                                         │
//! │   ✓ = user is a member of the store AND the store is active           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each operation returns a [`Transition`]: the next state plus what the
//! caller should do. Nothing here reads or writes a session; the async
//! guard in the app does that around these functions.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Access Data
// =============================================================================

/// A store the user is attached to, with its current active flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StoreMembership {
    pub store_id: String,
    pub name: String,
    pub code: String,
    pub is_active: bool,
}

/// Everything the guard needs to know about one user's stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StoreAccess {
    pub user_id: String,
    pub memberships: Vec<StoreMembership>,
}

impl StoreAccess {
    /// Checks that `store_id` is one of the user's stores and is active.
    pub fn check(&self, store_id: &str) -> Result<&StoreMembership, DenialReason> {
        let membership = self
            .memberships
            .iter()
            .find(|m| m.store_id == store_id)
            .ok_or(DenialReason::NotAMember)?;

        if !membership.is_active {
            return Err(DenialReason::Inactive);
        }
        Ok(membership)
    }

    /// Stores the selection view should offer.
    pub fn selectable(&self) -> impl Iterator<Item = &StoreMembership> {
        self.memberships.iter().filter(|m| m.is_active)
    }
}

/// Why a store cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum DenialReason {
    NotAMember,
    Inactive,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::NotAMember => f.write_str("user is not a member"),
            DenialReason::Inactive => f.write_str("store is inactive"),
        }
    }
}

// =============================================================================
// Session State
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "state", rename_all = "snake_case")]
#[ts(export)]
pub enum SessionState {
    #[default]
    NoStoreSelected,
    StoreSelected { store_id: String },
}

impl SessionState {
    pub fn selected(store_id: impl Into<String>) -> Self {
        SessionState::StoreSelected {
            store_id: store_id.into(),
        }
    }

    pub fn active_store_id(&self) -> Option<&str> {
        match self {
            SessionState::NoStoreSelected => None,
            SessionState::StoreSelected { store_id } => Some(store_id),
        }
    }
}

/// What the caller should do after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "effect", rename_all = "snake_case")]
#[ts(export)]
pub enum GuardEffect {
    /// Let the request through, scoped to this store.
    Proceed { store_id: String },
    /// Send the user to the store selection view.
    RedirectToSelection,
    /// A select or switch succeeded.
    Acknowledged { store_id: String },
    /// A select or switch was refused.
    Rejected {
        store_id: String,
        reason: DenialReason,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SessionState,
    pub effect: GuardEffect,
}

impl Transition {
    fn new(state: SessionState, effect: GuardEffect) -> Self {
        Self { state, effect }
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Gate for store-scoped views.
///
/// A stale selection (store left, or deactivated) is cleared rather than
/// replaced with some other store.
pub fn ensure_active_store(access: &StoreAccess, state: &SessionState) -> Transition {
    match state {
        SessionState::NoStoreSelected => {
            Transition::new(SessionState::NoStoreSelected, GuardEffect::RedirectToSelection)
        }
        SessionState::StoreSelected { store_id } => match access.check(store_id) {
            Ok(_) => Transition::new(
                state.clone(),
                GuardEffect::Proceed {
                    store_id: store_id.clone(),
                },
            ),
            Err(_) => {
                Transition::new(SessionState::NoStoreSelected, GuardEffect::RedirectToSelection)
            }
        },
    }
}

/// Initial pick from the selection view. The current state does not matter:
/// any failure leaves no store selected.
pub fn select_store(access: &StoreAccess, requested: &str) -> Transition {
    match access.check(requested) {
        Ok(_) => accept(requested),
        Err(reason) => Transition::new(
            SessionState::NoStoreSelected,
            GuardEffect::Rejected {
                store_id: requested.to_string(),
                reason,
            },
        ),
    }
}

/// Change the active store. A refused switch keeps whatever was there.
pub fn switch_store(access: &StoreAccess, state: &SessionState, requested: &str) -> Transition {
    match access.check(requested) {
        Ok(_) => accept(requested),
        Err(reason) => Transition::new(
            state.clone(),
            GuardEffect::Rejected {
                store_id: requested.to_string(),
                reason,
            },
        ),
    }
}

fn accept(store_id: &str) -> Transition {
    Transition::new(
        SessionState::selected(store_id),
        GuardEffect::Acknowledged {
            store_id: store_id.to_string(),
        },
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn membership(id: &str, active: bool) -> StoreMembership {
        StoreMembership {
            store_id: id.to_string(),
            name: format!("Store {id}"),
            code: id.to_uppercase(),
            is_active: active,
        }
    }

    /// Member of s1 (active) and s3 (inactive); not of s2.
    fn access() -> StoreAccess {
        StoreAccess {
            user_id: "u1".to_string(),
            memberships: vec![membership("s1", true), membership("s3", false)],
        }
    }

    #[test]
    fn test_ensure_without_selection_redirects() {
        let t = ensure_active_store(&access(), &SessionState::NoStoreSelected);
        assert_eq!(t.state, SessionState::NoStoreSelected);
        assert_eq!(t.effect, GuardEffect::RedirectToSelection);
    }

    #[test]
    fn test_ensure_valid_selection_proceeds() {
        let state = SessionState::selected("s1");
        let t = ensure_active_store(&access(), &state);
        assert_eq!(t.state, state);
        assert_eq!(t.effect, GuardEffect::Proceed { store_id: "s1".into() });
    }

    #[test]
    fn test_ensure_clears_stale_selection() {
        for stale in ["s2", "s3"] {
            let t = ensure_active_store(&access(), &SessionState::selected(stale));
            assert_eq!(t.state, SessionState::NoStoreSelected, "store {stale}");
            assert_eq!(t.effect, GuardEffect::RedirectToSelection);
        }
    }

    #[test]
    fn test_switch_to_non_member_keeps_state() {
        let state = SessionState::selected("s1");
        let t = switch_store(&access(), &state, "s2");
        assert_eq!(t.state, state);
        assert_eq!(
            t.effect,
            GuardEffect::Rejected {
                store_id: "s2".into(),
                reason: DenialReason::NotAMember
            }
        );
    }

    #[test]
    fn test_switch_to_inactive_store_is_rejected() {
        let t = switch_store(&access(), &SessionState::selected("s1"), "s3");
        assert!(matches!(
            t.effect,
            GuardEffect::Rejected {
                reason: DenialReason::Inactive,
                ..
            }
        ));
        assert_eq!(t.state.active_store_id(), Some("s1"));
    }

    #[test]
    fn test_switch_success_sets_store() {
        let t = switch_store(&access(), &SessionState::NoStoreSelected, "s1");
        assert_eq!(t.state, SessionState::selected("s1"));
        assert_eq!(t.effect, GuardEffect::Acknowledged { store_id: "s1".into() });
    }

    #[test]
    fn test_failed_select_leaves_no_store() {
        let t = select_store(&access(), "s2");
        assert_eq!(t.state, SessionState::NoStoreSelected);

        let t = select_store(&access(), "s3");
        assert_eq!(t.state, SessionState::NoStoreSelected);
        assert!(matches!(
            t.effect,
            GuardEffect::Rejected {
                reason: DenialReason::Inactive,
                ..
            }
        ));
    }

    #[test]
    fn test_select_success_sets_store() {
        let t = select_store(&access(), "s1");
        assert_eq!(t.state, SessionState::selected("s1"));
        assert_eq!(t.effect, GuardEffect::Acknowledged { store_id: "s1".into() });
    }

    #[test]
    fn test_selectable_hides_inactive() {
        let ids: Vec<_> = access().selectable().map(|m| m.store_id.clone()).collect();
        assert_eq!(ids, vec!["s1".to_string()]);
    }

    #[test]
    fn test_session_state_serializes_tagged() {
        let json = serde_json::to_value(SessionState::selected("s1")).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "store_selected", "store_id": "s1" }));
    }
}
