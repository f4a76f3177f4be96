//! # Settlement Planning
//!
//! Decides whether a sale return turns into store credit for a customer.
//!
//! ```text
//! policy == CustomerCredit ? ──no──► None (journal posting only)
//!          │ yes
//!          ▼
//! sale present with customer_id ? ──no──► None
//!          │ yes
//!          ▼
//! Some(CustomerCredit { amount = total_refund, reason = sale_return,
//!                       source = the return, meta = { sale_id } })
//! ```

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use ts_rs::TS;

use crate::accounting::SettlementPolicy;
use crate::money::Money;
use crate::types::{SaleReturn, SaleReturnRecord};
use crate::SALE_RETURN_SOURCE;

// =============================================================================
// Credit Types
// =============================================================================

/// Why a balance credit was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum CreditReason {
    SaleReturn,
}

impl CreditReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CreditReason::SaleReturn => "sale_return",
        }
    }
}

impl fmt::Display for CreditReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The record a credit is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreditSource {
    pub source_type: String,
    pub source_id: String,
}

impl CreditSource {
    pub fn sale_return(sale_return: &SaleReturn) -> Self {
        Self {
            source_type: SALE_RETURN_SOURCE.to_string(),
            source_id: sale_return.id.clone(),
        }
    }
}

/// A credit to add to a customer's balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerCredit {
    pub customer_id: String,
    pub amount: Money,
    pub reason: CreditReason,
    pub source: CreditSource,
    /// Free-form audit data, stored as JSON.
    #[ts(type = "Record<string, unknown>")]
    pub meta: serde_json::Value,
}

// =============================================================================
// Planning
// =============================================================================

/// Returns the credit to issue for a return, or `None` when the return is
/// settled another way or there is nobody to credit.
///
/// The amount is exactly `total_refund`, including a zero refund.
pub fn plan_settlement(
    record: &SaleReturnRecord,
    policy: &SettlementPolicy,
) -> Option<CustomerCredit> {
    if !policy.issues_customer_credit() {
        return None;
    }

    let sale = record.sale.as_ref()?;
    let customer_id = sale.customer_id.as_deref()?;
    let sale_return = &record.sale_return;

    Some(CustomerCredit {
        customer_id: customer_id.to_string(),
        amount: sale_return.total_refund(),
        reason: CreditReason::SaleReturn,
        source: CreditSource::sale_return(sale_return),
        meta: json!({ "sale_id": sale.id }),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sale;
    use chrono::Utc;

    fn record(customer_id: Option<&str>, with_sale: bool, refund: i64) -> SaleReturnRecord {
        let now = Utc::now();
        SaleReturnRecord {
            sale_return: SaleReturn {
                id: "ret-1".to_string(),
                sale_id: with_sale.then(|| "sale-9".to_string()),
                store_id: "store-1".to_string(),
                total_refund_cents: refund,
                tax_refund_cents: 0,
                reason: None,
                created_at: now,
            },
            sale: with_sale.then(|| Sale {
                id: "sale-9".to_string(),
                store_id: "store-1".to_string(),
                customer_id: customer_id.map(str::to_string),
                receipt_number: "R-0009".to_string(),
                total_cents: 20000,
                created_at: now,
            }),
        }
    }

    #[test]
    fn test_customer_credit_for_exact_refund() {
        let credit = plan_settlement(
            &record(Some("42"), true, 15000),
            &SettlementPolicy::CustomerCredit,
        )
        .unwrap();

        assert_eq!(credit.customer_id, "42");
        assert_eq!(credit.amount, Money::from_cents(15000));
        assert_eq!(credit.reason, CreditReason::SaleReturn);
        assert_eq!(credit.source.source_type, "sale_return");
        assert_eq!(credit.source.source_id, "ret-1");
        assert_eq!(credit.meta, json!({ "sale_id": "sale-9" }));
    }

    #[test]
    fn test_no_credit_without_customer() {
        assert!(plan_settlement(&record(None, true, 15000), &SettlementPolicy::CustomerCredit).is_none());
    }

    #[test]
    fn test_no_credit_when_sale_missing() {
        assert!(plan_settlement(&record(None, false, 15000), &SettlementPolicy::CustomerCredit).is_none());
    }

    #[test]
    fn test_no_credit_for_other_policies() {
        let r = record(Some("42"), true, 15000);
        assert!(plan_settlement(&r, &SettlementPolicy::Cash).is_none());
        assert!(plan_settlement(&r, &SettlementPolicy::Unrecognized("voucher".into())).is_none());
    }

    #[test]
    fn test_zero_refund_still_credits_zero() {
        let credit =
            plan_settlement(&record(Some("42"), true, 0), &SettlementPolicy::CustomerCredit).unwrap();
        assert!(credit.amount.is_zero());
    }
}
