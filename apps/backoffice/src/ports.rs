//! # Collaborator Ports
//!
//! The services depend on these traits, never on harbor-db directly.
//! SQLite implementations live in [`crate::adapters`]; tests use fakes.
//!
//! ```text
//! ReturnSettlementService ──► SaleReturnSource, JournalService, CustomerBalanceService
//! StoreSessionGuard       ──► StoreDirectory, SessionStore
//! ```

use async_trait::async_trait;

use harbor_core::accounting::AccountMap;
use harbor_core::session::{SessionState, StoreAccess};
use harbor_core::settlement::CustomerCredit;
use harbor_core::{SaleReturn, SaleReturnRecord};

use crate::error::BackofficeResult;

/// Loads a sale return with its originating sale.
#[async_trait]
pub trait SaleReturnSource: Send + Sync {
    /// `Ok(None)` when no such return exists.
    async fn find_with_sale(&self, sale_return_id: &str) -> BackofficeResult<Option<SaleReturnRecord>>;
}

/// Posts the journal entry for a sale return.
///
/// Implementations must post at most once per sale return; a repeat call
/// for an already-posted return succeeds without writing.
#[async_trait]
pub trait JournalService: Send + Sync {
    async fn create_for_sale_return(
        &self,
        sale_return: &SaleReturn,
        map: &AccountMap,
    ) -> BackofficeResult<()>;
}

/// Adds store credit to a customer's balance. Additive and not idempotent.
#[async_trait]
pub trait CustomerBalanceService: Send + Sync {
    async fn credit(&self, credit: &CustomerCredit) -> BackofficeResult<()>;
}

/// Which stores a user belongs to, and whether each is active.
#[async_trait]
pub trait StoreDirectory: Send + Sync {
    async fn store_access(&self, user_id: &str) -> BackofficeResult<StoreAccess>;
}

/// Per-session active-store state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Unknown sessions load as [`SessionState::NoStoreSelected`].
    async fn load(&self, session_id: &str) -> BackofficeResult<SessionState>;

    async fn save(&self, session_id: &str, state: SessionState) -> BackofficeResult<()>;
}
