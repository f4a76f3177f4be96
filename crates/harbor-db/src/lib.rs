//! # harbor-db: Database Layer for the Harbor Back Office
//!
//! SQLite access via sqlx for the settlement workflow and the store guard.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Harbor Data Flow                                 │
//! │                                                                         │
//! │  ReturnSettlementService / StoreSessionGuard (apps/backoffice)         │
//! │       │  via the adapters in backoffice::adapters                      │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     harbor-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌──────────────────┐   ┌─────────────┐  │   │
//! │  │   │   Database    │    │  Repositories    │   │ Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ SaleReturnRepo   │   │ (embedded)  │  │   │
//! │  │   │ SqlitePool    │    │ JournalRepo      │   │ 001_init    │  │   │
//! │  │   │               │    │ BalanceRepo      │   │             │  │   │
//! │  │   │               │    │ StoreRepo        │   │             │  │   │
//! │  │   └───────────────┘    └──────────────────┘   └─────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL)                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use harbor_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("harbor.db")).await?;
//! let record = db.sale_returns().find_with_sale("ret-1").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::balance::{BalanceEntry, CustomerBalanceRepository};
pub use repository::journal::{JournalEntry, JournalRepository, PostOutcome};
pub use repository::sale_return::SaleReturnRepository;
pub use repository::store::StoreRepository;
