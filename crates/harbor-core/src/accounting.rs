//! # Accounting Module
//!
//! Account roles, the configurable account map, journal drafts for sale
//! returns, and the settlement policy.
//!
//! ## Sale Return Posting
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Return of $108.25 (of which $8.25 tax)                                 │
//! │                                                                         │
//! │  account role         code (from map)      debit       credit          │
//! │  ──────────────────   ───────────────   ─────────   ──────────         │
//! │  sales_returns            4100            100.00                        │
//! │  sales_tax_payable        2200              8.25                        │
//! │  refunds_payable          2050                          108.25          │
//! │                                         ─────────   ──────────         │
//! │                                           108.25        108.25  ✓      │
//! │                                                                         │
//! │  Zero-amount lines are dropped, so a tax-free return has two lines.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The draft is only a value. Persisting it (and deduplicating by source)
//! is the journal repository's job.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::SaleReturn;
use crate::validation::validate_refund;
use crate::SALE_RETURN_SOURCE;

// =============================================================================
// Account Roles
// =============================================================================

/// Ledger roles a sale-return posting touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountRole {
    /// Contra-revenue account for returned merchandise.
    SalesReturns,
    /// Output tax that no longer has to be remitted.
    SalesTaxPayable,
    /// Liability owed to the customer until paid out or converted to credit.
    RefundsPayable,
}

impl AccountRole {
    /// Roles every account map must define.
    pub const REQUIRED: [AccountRole; 3] = [
        AccountRole::SalesReturns,
        AccountRole::SalesTaxPayable,
        AccountRole::RefundsPayable,
    ];

    /// Key used for this role in `[accounting.map]`.
    pub const fn key(&self) -> &'static str {
        match self {
            AccountRole::SalesReturns => "sales_returns",
            AccountRole::SalesTaxPayable => "sales_tax_payable",
            AccountRole::RefundsPayable => "refunds_payable",
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// =============================================================================
// Account Map
// =============================================================================

/// Role → ledger account code, as configured under `accounting.map`.
///
/// Roles the return posting does not use are kept untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountMap(BTreeMap<String, String>);

impl AccountMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and defaults.
    pub fn with(mut self, role: impl Into<String>, code: impl Into<String>) -> Self {
        self.0.insert(role.into(), code.into());
        self
    }

    pub fn get(&self, role: &str) -> Option<&str> {
        self.0.get(role).map(String::as_str)
    }

    /// Looks up a role, failing with [`CoreError::MissingAccountRole`].
    ///
    /// A blank code counts as missing.
    pub fn require(&self, role: AccountRole) -> CoreResult<&str> {
        match self.get(role.key()) {
            Some(code) if !code.trim().is_empty() => Ok(code),
            _ => Err(CoreError::MissingAccountRole(role.key().to_string())),
        }
    }

    /// First required role that is absent, if any.
    pub fn missing_required(&self) -> Option<AccountRole> {
        AccountRole::REQUIRED
            .into_iter()
            .find(|role| self.require(*role).is_err())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =============================================================================
// Journal Draft
// =============================================================================

/// One line of a journal entry. Exactly one of debit/credit is non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct JournalLine {
    pub account_code: String,
    pub debit_cents: i64,
    pub credit_cents: i64,
}

impl JournalLine {
    pub fn debit(account_code: &str, amount: Money) -> Self {
        Self {
            account_code: account_code.to_string(),
            debit_cents: amount.cents(),
            credit_cents: 0,
        }
    }

    pub fn credit(account_code: &str, amount: Money) -> Self {
        Self {
            account_code: account_code.to_string(),
            debit_cents: 0,
            credit_cents: amount.cents(),
        }
    }
}

/// An unposted journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct JournalDraft {
    pub source_type: String,
    pub source_id: String,
    pub memo: String,
    pub lines: Vec<JournalLine>,
}

impl JournalDraft {
    pub fn total_debits(&self) -> Money {
        self.lines.iter().map(|l| Money::from_cents(l.debit_cents)).sum()
    }

    pub fn total_credits(&self) -> Money {
        self.lines.iter().map(|l| Money::from_cents(l.credit_cents)).sum()
    }

    /// Fails with [`CoreError::UnbalancedEntry`] when debits != credits.
    pub fn ensure_balanced(&self) -> CoreResult<()> {
        let debits = self.total_debits();
        let credits = self.total_credits();
        if debits != credits {
            return Err(CoreError::UnbalancedEntry {
                debits: debits.cents(),
                credits: credits.cents(),
            });
        }
        Ok(())
    }
}

/// Builds the balanced posting for a sale return.
///
/// ## Errors
/// - [`CoreError::InvalidRefund`] if the amounts break `0 <= tax <= total`
/// - [`CoreError::MissingAccountRole`] if the map lacks a role that a
///   non-zero line needs
///
/// ```rust
/// use harbor_core::accounting::{build_sale_return_entry, AccountMap};
/// use harbor_core::SaleReturn;
///
/// let map = AccountMap::new()
///     .with("sales_returns", "4100")
///     .with("sales_tax_payable", "2200")
///     .with("refunds_payable", "2050");
/// let sale_return = SaleReturn {
///     id: "ret-1".into(),
///     sale_id: Some("sale-1".into()),
///     store_id: "store-1".into(),
///     total_refund_cents: 10825,
///     tax_refund_cents: 825,
///     reason: None,
///     created_at: chrono::Utc::now(),
/// };
///
/// let draft = build_sale_return_entry(&sale_return, &map).unwrap();
/// assert_eq!(draft.lines.len(), 3);
/// assert!(draft.ensure_balanced().is_ok());
/// ```
pub fn build_sale_return_entry(
    sale_return: &SaleReturn,
    map: &AccountMap,
) -> CoreResult<JournalDraft> {
    validate_refund(sale_return.total_refund_cents, sale_return.tax_refund_cents)?;

    let net = sale_return.net_refund();
    let tax = sale_return.tax_refund();
    let total = sale_return.total_refund();

    let mut lines = Vec::with_capacity(3);
    if !net.is_zero() {
        lines.push(JournalLine::debit(map.require(AccountRole::SalesReturns)?, net));
    }
    if !tax.is_zero() {
        lines.push(JournalLine::debit(map.require(AccountRole::SalesTaxPayable)?, tax));
    }
    if !total.is_zero() {
        lines.push(JournalLine::credit(map.require(AccountRole::RefundsPayable)?, total));
    }

    let memo = match sale_return.reason.as_deref() {
        Some(reason) if !reason.trim().is_empty() => {
            format!("Sale return {} ({})", sale_return.id, reason.trim())
        }
        _ => format!("Sale return {}", sale_return.id),
    };

    let draft = JournalDraft {
        source_type: SALE_RETURN_SOURCE.to_string(),
        source_id: sale_return.id.clone(),
        memo,
        lines,
    };
    draft.ensure_balanced()?;
    Ok(draft)
}

// =============================================================================
// Settlement Policy
// =============================================================================

/// How a return's value is settled, from `accounting.returns.default_settlement`.
///
/// Only [`SettlementPolicy::CustomerCredit`] triggers automatic credit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SettlementPolicy {
    /// Refund is paid out at the till; nothing is credited.
    #[default]
    Cash,
    /// Refund becomes store credit on the customer's balance.
    CustomerCredit,
    /// A configured value this build does not know. Treated like cash.
    Unrecognized(String),
}

impl SettlementPolicy {
    pub const CUSTOMER_CREDIT: &'static str = "customer_credit";

    pub fn issues_customer_credit(&self) -> bool {
        matches!(self, SettlementPolicy::CustomerCredit)
    }

    pub fn as_str(&self) -> &str {
        match self {
            SettlementPolicy::Cash => "cash",
            SettlementPolicy::CustomerCredit => Self::CUSTOMER_CREDIT,
            SettlementPolicy::Unrecognized(raw) => raw,
        }
    }
}

impl From<&str> for SettlementPolicy {
    fn from(raw: &str) -> Self {
        match raw.trim() {
            Self::CUSTOMER_CREDIT => SettlementPolicy::CustomerCredit,
            "cash" | "refund" => SettlementPolicy::Cash,
            other => SettlementPolicy::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for SettlementPolicy {
    fn from(raw: String) -> Self {
        SettlementPolicy::from(raw.as_str())
    }
}

impl From<SettlementPolicy> for String {
    fn from(policy: SettlementPolicy) -> Self {
        policy.as_str().to_string()
    }
}

impl fmt::Display for SettlementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
