//! # harbor-core: Pure Business Logic for the Harbor Back Office
//!
//! This crate holds the rules that decide what a sale return means
//! financially and which store a back-office session is allowed to work in.
//! Everything here is a pure function over plain data.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Harbor Back Office Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                apps/backoffice (async orchestration)            │   │
//! │  │   SettlementWorker ──► ReturnSettlementService                  │   │
//! │  │   StoreSessionGuard ──► SessionStore / StoreDirectory           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ harbor-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌────────────┐  ┌──────────┐  │   │
//! │  │   │   types   │  │ accounting │  │ settlement │  │ session  │  │   │
//! │  │   │ SaleReturn│  │ AccountMap │  │ plan_      │  │ FSM      │  │   │
//! │  │   │   Store   │  │ Journal    │  │ settlement │  │ Transition│ │   │
//! │  │   └───────────┘  └────────────┘  └────────────┘  └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    harbor-db (Database Layer)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Sale, SaleReturn, Store)
//! - [`money`] - Money type with integer arithmetic
//! - [`accounting`] - Account map, journal drafts, settlement policy
//! - [`settlement`] - Decides whether a return issues customer credit
//! - [`session`] - Active-store state machine for back-office sessions
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use harbor_core::accounting::{AccountMap, SettlementPolicy};
//! use harbor_core::settlement::plan_settlement;
//! use harbor_core::{Money, Sale, SaleReturn, SaleReturnRecord};
//! use chrono::Utc;
//!
//! let now = Utc::now();
//! let sale = Sale {
//!     id: "sale-1".into(),
//!     store_id: "store-1".into(),
//!     customer_id: Some("42".into()),
//!     receipt_number: "R-0001".into(),
//!     total_cents: 15000,
//!     created_at: now,
//! };
//! let sale_return = SaleReturn {
//!     id: "ret-1".into(),
//!     sale_id: Some(sale.id.clone()),
//!     store_id: "store-1".into(),
//!     total_refund_cents: 15000,
//!     tax_refund_cents: 0,
//!     reason: None,
//!     created_at: now,
//! };
//! let record = SaleReturnRecord { sale_return, sale: Some(sale) };
//!
//! let credit = plan_settlement(&record, &SettlementPolicy::CustomerCredit).unwrap();
//! assert_eq!(credit.customer_id, "42");
//! assert_eq!(credit.amount, Money::from_cents(15000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod accounting;
pub mod error;
pub mod money;
pub mod session;
pub mod settlement;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Source type recorded on journal entries and balance credits that
/// originate from a sale return.
pub const SALE_RETURN_SOURCE: &str = "sale_return";
