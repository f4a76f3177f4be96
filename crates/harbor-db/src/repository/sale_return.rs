//! # Sale Return Repository
//!
//! Sales, returns raised against them, and the combined lookup the
//! settlement service starts from.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use harbor_core::validation::validate_refund;
use harbor_core::{Sale, SaleReturn, SaleReturnRecord};

const SALE_COLUMNS: &str = "id, store_id, customer_id, receipt_number, total_cents, created_at";
const RETURN_COLUMNS: &str =
    "id, sale_id, store_id, total_refund_cents, tax_refund_cents, reason, created_at";

#[derive(Debug, Clone)]
pub struct SaleReturnRepository {
    pool: SqlitePool,
}

impl SaleReturnRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleReturnRepository { pool }
    }

    // =========================================================================
    // Sales
    // =========================================================================

    pub async fn insert_sale(&self, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, receipt_number = %sale.receipt_number, "Inserting sale");

        sqlx::query(
            "INSERT INTO sales (id, store_id, customer_id, receipt_number, total_cents, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&sale.id)
        .bind(&sale.store_id)
        .bind(&sale.customer_id)
        .bind(&sale.receipt_number)
        .bind(sale.total_cents)
        .bind(sale.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_sale(&self, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(sale)
    }

    /// Deletes a sale. Returns raised against it keep existing with
    /// `sale_id` set to NULL.
    pub async fn delete_sale(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting sale");
        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Returns
    // =========================================================================

    /// Inserts a return after checking `0 <= tax <= total`.
    pub async fn insert_return(&self, sale_return: &SaleReturn) -> DbResult<()> {
        validate_refund(sale_return.total_refund_cents, sale_return.tax_refund_cents)?;

        debug!(
            id = %sale_return.id,
            sale_id = ?sale_return.sale_id,
            total_refund_cents = sale_return.total_refund_cents,
            "Inserting sale return"
        );

        sqlx::query(
            "INSERT INTO sale_returns
                (id, sale_id, store_id, total_refund_cents, tax_refund_cents, reason, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&sale_return.id)
        .bind(&sale_return.sale_id)
        .bind(&sale_return.store_id)
        .bind(sale_return.total_refund_cents)
        .bind(sale_return.tax_refund_cents)
        .bind(&sale_return.reason)
        .bind(sale_return.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_return(&self, id: &str) -> DbResult<Option<SaleReturn>> {
        let sql = format!("SELECT {RETURN_COLUMNS} FROM sale_returns WHERE id = ?1");
        let sale_return = sqlx::query_as::<_, SaleReturn>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(sale_return)
    }

    /// Loads a return together with its sale.
    ///
    /// `Ok(None)` when the return does not exist. A return whose sale was
    /// deleted comes back with `sale: None`.
    pub async fn find_with_sale(&self, id: &str) -> DbResult<Option<SaleReturnRecord>> {
        debug!(id = %id, "Loading sale return with sale");

        let Some(sale_return) = self.get_return(id).await? else {
            return Ok(None);
        };

        let sale = match sale_return.sale_id.as_deref() {
            Some(sale_id) => self.get_sale(sale_id).await?,
            None => None,
        };

        Ok(Some(SaleReturnRecord { sale_return, sale }))
    }

    pub async fn count_returns(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_returns")
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
    use crate::error::DbError;
    use crate::{Database, DbConfig};
    use chrono::Utc;

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("INSERT INTO stores (id, name, code, is_active, created_at) VALUES ('s1', 'Main', 'MAIN', 1, ?1)")
            .bind(Utc::now())
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO customers (id, name, email, created_at) VALUES ('42', 'Ada', NULL, ?1)")
            .bind(Utc::now())
            .execute(db.pool())
            .await
            .unwrap();
        db
    }

    fn sale(id: &str, customer_id: Option<&str>) -> Sale {
        Sale {
            id: id.to_string(),
            store_id: "s1".to_string(),
            customer_id: customer_id.map(str::to_string),
            receipt_number: format!("R-{id}"),
            total_cents: 15000,
            created_at: Utc::now(),
        }
    }

    fn sale_return(id: &str, sale_id: Option<&str>, total: i64, tax: i64) -> SaleReturn {
        SaleReturn {
            id: id.to_string(),
            sale_id: sale_id.map(str::to_string),
            store_id: "s1".to_string(),
            total_refund_cents: total,
            tax_refund_cents: tax,
            reason: Some("defective".to_string()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_find_with_sale_loads_both() {
        let db = setup().await;
        let repo = db.sale_returns();
        repo.insert_sale(&sale("sale-1", Some("42"))).await.unwrap();
        repo.insert_return(&sale_return("ret-1", Some("sale-1"), 15000, 0))
            .await
            .unwrap();

        let record = repo.find_with_sale("ret-1").await.unwrap().unwrap();
        assert_eq!(record.sale_return.total_refund_cents, 15000);
        assert_eq!(record.sale_return.reason.as_deref(), Some("defective"));
        assert_eq!(record.customer_id(), Some("42"));
    }

    #[tokio::test]
    async fn test_find_missing_return_is_none() {
        let db = setup().await;
        assert!(db.sale_returns().find_with_sale("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deleted_sale_leaves_orphan_return() {
        let db = setup().await;
        let repo = db.sale_returns();
        repo.insert_sale(&sale("sale-2", Some("42"))).await.unwrap();
        repo.insert_return(&sale_return("ret-2", Some("sale-2"), 500, 0))
            .await
            .unwrap();

        assert!(repo.delete_sale("sale-2").await.unwrap());

        let record = repo.find_with_sale("ret-2").await.unwrap().unwrap();
        assert_eq!(record.sale_return.sale_id, None);
        assert!(record.sale.is_none());
    }

    #[tokio::test]
    async fn test_invalid_refund_rejected_before_insert() {
        let db = setup().await;
        let err = db
            .sale_returns()
            .insert_return(&sale_return("ret-3", None, 100, 200))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(_)));
        assert_eq!(db.sale_returns().count_returns().await.unwrap(), 0);
    }
}
