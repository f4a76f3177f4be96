//! # Customer Balance Repository
//!
//! Append-only credit entries; a customer's balance is their sum.
//!
//! Nothing here dedupes by source. Crediting the same sale return twice
//! writes two rows.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use harbor_core::settlement::CustomerCredit;
use harbor_core::validation::validate_credit_amount;
use harbor_core::{Customer, Money};

/// One stored credit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceEntry {
    pub id: String,
    pub customer_id: String,
    pub amount: Money,
    pub reason: String,
    pub source_type: String,
    pub source_id: String,
    pub meta: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct BalanceRow {
    id: String,
    customer_id: String,
    amount_cents: i64,
    reason: String,
    source_type: String,
    source_id: String,
    meta: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<BalanceRow> for BalanceEntry {
    type Error = DbError;

    fn try_from(row: BalanceRow) -> Result<Self, Self::Error> {
        let meta = serde_json::from_str(&row.meta).map_err(|e| DbError::Corrupt {
            what: format!("balance entry {} meta", row.id),
            message: e.to_string(),
        })?;

        Ok(BalanceEntry {
            id: row.id,
            customer_id: row.customer_id,
            amount: Money::from_cents(row.amount_cents),
            reason: row.reason,
            source_type: row.source_type,
            source_id: row.source_id,
            meta,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CustomerBalanceRepository {
    pool: SqlitePool,
}

impl CustomerBalanceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerBalanceRepository { pool }
    }

    pub async fn insert_customer(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, "Inserting customer");

        sqlx::query("INSERT INTO customers (id, name, email, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(&customer.id)
            .bind(&customer.name)
            .bind(&customer.email)
            .bind(customer.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Appends a credit entry.
    pub async fn credit(&self, credit: &CustomerCredit) -> DbResult<BalanceEntry> {
        validate_credit_amount(credit.amount.cents()).map_err(harbor_core::CoreError::from)?;

        let entry = BalanceEntry {
            id: Uuid::new_v4().to_string(),
            customer_id: credit.customer_id.clone(),
            amount: credit.amount,
            reason: credit.reason.as_str().to_string(),
            source_type: credit.source.source_type.clone(),
            source_id: credit.source.source_id.clone(),
            meta: credit.meta.clone(),
            created_at: Utc::now(),
        };

        let meta = serde_json::to_string(&entry.meta).map_err(|e| DbError::Corrupt {
            what: "credit meta".to_string(),
            message: e.to_string(),
        })?;

        sqlx::query(
            "INSERT INTO customer_balance_entries
                (id, customer_id, amount_cents, reason, source_type, source_id, meta, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&entry.id)
        .bind(&entry.customer_id)
        .bind(entry.amount.cents())
        .bind(&entry.reason)
        .bind(&entry.source_type)
        .bind(&entry.source_id)
        .bind(meta)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        info!(
            entry_id = %entry.id,
            customer_id = %entry.customer_id,
            amount_cents = entry.amount.cents(),
            source_id = %entry.source_id,
            "Customer credited"
        );

        Ok(entry)
    }

    /// Current balance: the sum of all entries, zero for an unknown customer.
    pub async fn balance(&self, customer_id: &str) -> DbResult<Money> {
        let cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM customer_balance_entries WHERE customer_id = ?1",
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(Money::from_cents(cents))
    }

    /// Entries for a customer, oldest first.
    pub async fn entries(&self, customer_id: &str) -> DbResult<Vec<BalanceEntry>> {
        let rows = sqlx::query_as::<_, BalanceRow>(
            "SELECT id, customer_id, amount_cents, reason, source_type, source_id, meta, created_at
             FROM customer_balance_entries
             WHERE customer_id = ?1
             ORDER BY created_at, rowid",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BalanceEntry::try_from).collect()
    }

    pub async fn count_for_source(&self, source_type: &str, source_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM customer_balance_entries WHERE source_type = ?1 AND source_id = ?2",
        )
        .bind(source_type)
        .bind(source_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use harbor_core::settlement::{CreditReason, CreditSource};
    use serde_json::json;

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.balances()
            .insert_customer(&Customer {
                id: "42".to_string(),
                name: "Ada Lovelace".to_string(),
                email: Some("ada@example.com".to_string()),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        db
    }

    fn credit(source_id: &str, cents: i64) -> CustomerCredit {
        CustomerCredit {
            customer_id: "42".to_string(),
            amount: Money::from_cents(cents),
            reason: CreditReason::SaleReturn,
            source: CreditSource {
                source_type: "sale_return".to_string(),
                source_id: source_id.to_string(),
            },
            meta: json!({ "sale_id": "sale-1" }),
        }
    }

    #[tokio::test]
    async fn test_balance_is_sum_of_credits() {
        let db = setup().await;
        let balances = db.balances();

        assert_eq!(balances.balance("42").await.unwrap(), Money::zero());

        balances.credit(&credit("ret-1", 15000)).await.unwrap();
        balances.credit(&credit("ret-2", 250)).await.unwrap();

        assert_eq!(balances.balance("42").await.unwrap(), Money::from_cents(15250));
    }

    #[tokio::test]
    async fn test_meta_round_trips_as_json() {
        let db = setup().await;
        db.balances().credit(&credit("ret-1", 100)).await.unwrap();

        let entries = db.balances().entries("42").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].meta["sale_id"], "sale-1");
        assert_eq!(entries[0].reason, "sale_return");
    }

    #[tokio::test]
    async fn test_same_source_credited_twice_writes_two_rows() {
        let db = setup().await;
        let balances = db.balances();
        balances.credit(&credit("ret-1", 15000)).await.unwrap();
        balances.credit(&credit("ret-1", 15000)).await.unwrap();

        assert_eq!(balances.count_for_source("sale_return", "ret-1").await.unwrap(), 2);
        assert_eq!(balances.balance("42").await.unwrap(), Money::from_cents(30000));
    }

    #[tokio::test]
    async fn test_unknown_customer_violates_foreign_key() {
        let db = setup().await;
        let mut c = credit("ret-1", 100);
        c.customer_id = "ghost".to_string();

        let err = db.balances().credit(&c).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_negative_credit_rejected() {
        let db = setup().await;
        let err = db.balances().credit(&credit("ret-1", -1)).await.unwrap_err();
        assert!(matches!(err, DbError::Core(_)));
    }
}
