//! Back office services.
//!
//! ```text
//! ┌─────────────────────────────┐   ┌─────────────────────────────┐
//! │  ReturnSettlementService    │   │  StoreSessionGuard          │
//! │  • handle(sale_return_id)   │   │  • ensure_active_store      │
//! │                             │   │  • select_store             │
//! │                             │   │  • switch_store             │
//! └─────────────────────────────┘   └─────────────────────────────┘
//! ```
//!
//! The two share no state.

pub mod settlement;
pub mod store_session;

pub use settlement::ReturnSettlementService;
pub use store_session::StoreSessionGuard;
