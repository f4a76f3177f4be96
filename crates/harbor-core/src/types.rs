//! # Domain Types
//!
//! Records the back office reads while settling returns and scoping sessions.
//!
//! ## Type Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │◄──│      Sale       │◄──│   SaleReturn    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name           │   │  customer_id ?  │   │  sale_id ?      │       │
//! │  │  email ?        │   │  receipt_number │   │  total_refund   │       │
//! │  └─────────────────┘   │  total_cents    │   │  tax_refund     │       │
//! │                        └────────┬────────┘   └─────────────────┘       │
//! │                                 │                                       │
//! │                        ┌────────▼────────┐   ┌─────────────────┐       │
//! │                        │      Store      │◄──│  StoreMember    │       │
//! │                        │  is_active      │   │  user ↔ store   │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ? = nullable. A deleted sale leaves SaleReturn.sale_id empty.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Customer
// =============================================================================

/// A customer who may hold store credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale
// =============================================================================

/// The original sale a return is raised against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub store_id: String,
    /// Walk-in sales have no customer.
    pub customer_id: Option<String>,
    pub receipt_number: String,
    pub total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Sale Return
// =============================================================================

/// Merchandise returned against a prior sale.
///
/// `tax_refund_cents` is the tax portion already included in
/// `total_refund_cents`, so `0 <= tax_refund_cents <= total_refund_cents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleReturn {
    pub id: String,
    /// Empty once the originating sale has been deleted.
    pub sale_id: Option<String>,
    pub store_id: String,
    pub total_refund_cents: i64,
    pub tax_refund_cents: i64,
    pub reason: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SaleReturn {
    #[inline]
    pub fn total_refund(&self) -> Money {
        Money::from_cents(self.total_refund_cents)
    }

    #[inline]
    pub fn tax_refund(&self) -> Money {
        Money::from_cents(self.tax_refund_cents)
    }

    /// Refund amount excluding tax.
    #[inline]
    pub fn net_refund(&self) -> Money {
        self.total_refund() - self.tax_refund()
    }
}

/// A sale return loaded together with its originating sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleReturnRecord {
    pub sale_return: SaleReturn,
    pub sale: Option<Sale>,
}

impl SaleReturnRecord {
    /// The customer on the originating sale, if both exist.
    pub fn customer_id(&self) -> Option<&str> {
        self.sale.as_ref().and_then(|s| s.customer_id.as_deref())
    }
}

// =============================================================================
// Store
// =============================================================================

/// A physical or virtual store location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Store {
    pub id: String,
    pub name: String,
    /// Short business code shown in the store switcher ("DT-01").
    pub code: String,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
