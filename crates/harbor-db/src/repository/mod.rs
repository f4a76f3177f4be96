//! # Repository Module
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Repository              Tables                    Used by              │
//! │  ──────────────────────  ────────────────────────  ──────────────────   │
//! │  SaleReturnRepository    sale_returns, sales       settlement (load)   │
//! │  JournalRepository       journal_entries, _lines   settlement (post)   │
//! │  CustomerBalanceRepo     customer_balance_entries  settlement (credit) │
//! │  StoreRepository         stores, users, store_user store guard         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All queries are runtime-checked (`sqlx::query` / `query_as`), so the
//! crate builds without a `DATABASE_URL`.

pub mod balance;
pub mod journal;
pub mod sale_return;
pub mod store;
