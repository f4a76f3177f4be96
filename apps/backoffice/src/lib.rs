//! # Harbor Back Office
//!
//! Settles sale returns and guards which store a back-office session works in.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Back Office                                     │
//! │                                                                         │
//! │  POS commit ──► DomainEvent::SaleReturned ──► SettlementWorker          │
//! │                                                   │                     │
//! │                                                   ▼                     │
//! │                                     ReturnSettlementService             │
//! │                                     ├─► SaleReturnSource                │
//! │                                     ├─► JournalService                  │
//! │                                     └─► CustomerBalanceService          │
//! │                                                                         │
//! │  request ──► StoreSessionGuard ──► StoreDirectory + SessionStore        │
//! │                                                                         │
//! │  ports (traits) ◄── adapters (harbor-db SQLite repositories)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod adapters;
pub mod config;
pub mod error;
pub mod events;
pub mod ports;
pub mod services;
pub mod session_store;
pub mod worker;

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use harbor_db::{Database, DbConfig};

// Re-exports
pub use config::BackofficeConfig;
pub use error::{BackofficeError, BackofficeResult};
pub use events::DomainEvent;
pub use services::{ReturnSettlementService, StoreSessionGuard};
pub use session_store::MemorySessionStore;
pub use worker::{SettlementWorker, SettlementWorkerHandle, WorkerStats};

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,harbor=debug,backoffice=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Services wired to one SQLite database.
pub struct Backoffice {
    pub db: Database,
    pub config: BackofficeConfig,
    pub settlement: Arc<ReturnSettlementService>,
    pub guard: StoreSessionGuard,
    pub sessions: MemorySessionStore,
}

impl Backoffice {
    /// Opens the configured database and wires the services to it.
    pub async fn open(config: BackofficeConfig) -> BackofficeResult<Self> {
        let db = Database::new(DbConfig::new(config.database.path.clone())).await?;
        Ok(Self::with_database(db, config))
    }

    pub fn with_database(db: Database, config: BackofficeConfig) -> Self {
        let settlement = Arc::new(ReturnSettlementService::new(
            Arc::new(db.sale_returns()),
            Arc::new(db.journal()),
            Arc::new(db.balances()),
            config.accounting.clone(),
        ));

        let sessions = MemorySessionStore::new();
        let guard = StoreSessionGuard::new(Arc::new(db.stores()), Arc::new(sessions.clone()));

        info!(
            policy = %config.accounting.settlement_policy(),
            "Back office services ready"
        );

        Backoffice {
            db,
            config,
            settlement,
            guard,
            sessions,
        }
    }

    /// Creates a settlement worker sized from `[worker]`.
    pub fn settlement_worker(&self) -> (SettlementWorker, SettlementWorkerHandle) {
        SettlementWorker::new(self.settlement.clone(), self.config.worker.queue_capacity)
    }

    /// Closes the pool, then hands back `result`. The pool is closed on the
    /// error path too.
    pub async fn close_with<T>(self, result: BackofficeResult<T>) -> BackofficeResult<T> {
        self.db.close().await;
        if let Err(e) = &result {
            info!(error = %e, "Database closed after failed command");
        }
        result
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use harbor_db::DbError;

    async fn app() -> Backoffice {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Backoffice::with_database(db, BackofficeConfig::default())
    }

    #[tokio::test]
    async fn test_close_with_closes_pool_on_error() {
        let app = app().await;
        let db = app.db.clone();

        let result: BackofficeResult<()> =
            app.close_with(Err(DbError::PoolExhausted.into())).await;

        assert!(matches!(result, Err(BackofficeError::Database(DbError::PoolExhausted))));
        assert!(db.pool().is_closed());
    }

    #[tokio::test]
    async fn test_close_with_passes_success_through() {
        let app = app().await;
        let db = app.db.clone();

        assert_eq!(app.close_with(Ok(7)).await.unwrap(), 7);
        assert!(db.pool().is_closed());
    }
}
