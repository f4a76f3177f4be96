//! # Journal Repository
//!
//! Persists journal drafts, at most once per source record.
//!
//! ## Dedupe
//! ```text
//! post(draft)
//!   │
//!   ├── entry for (source_type, source_id) exists? ──yes──► Existing(entry)
//!   │
//!   ▼ no
//! BEGIN
//!   INSERT journal_entries ──UNIQUE violation (lost a race)──► ROLLBACK,
//!   │                                                          Existing(entry)
//!   INSERT journal_lines (line_no 0..n)
//! COMMIT ──► Created(entry)
//! ```
//!
//! A redelivered sale-return event therefore never double-posts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use harbor_core::accounting::{build_sale_return_entry, AccountMap, JournalDraft, JournalLine};
use harbor_core::SaleReturn;

/// A posted journal entry with its lines in posting order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalEntry {
    pub id: String,
    pub source_type: String,
    pub source_id: String,
    pub memo: String,
    pub posted_at: DateTime<Utc>,
    pub lines: Vec<JournalLine>,
}

#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    id: String,
    source_type: String,
    source_id: String,
    memo: String,
    posted_at: DateTime<Utc>,
}

/// Result of [`JournalRepository::post`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    Created(JournalEntry),
    /// The source was already posted; nothing was written.
    Existing(JournalEntry),
}

impl PostOutcome {
    pub fn entry(&self) -> &JournalEntry {
        match self {
            PostOutcome::Created(entry) | PostOutcome::Existing(entry) => entry,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, PostOutcome::Created(_))
    }
}

#[derive(Debug, Clone)]
pub struct JournalRepository {
    pool: SqlitePool,
}

impl JournalRepository {
    pub fn new(pool: SqlitePool) -> Self {
        JournalRepository { pool }
    }

    /// Builds and posts the entry for a sale return.
    pub async fn post_sale_return(
        &self,
        sale_return: &SaleReturn,
        map: &AccountMap,
    ) -> DbResult<PostOutcome> {
        let draft = build_sale_return_entry(sale_return, map)?;
        self.post(&draft).await
    }

    /// Posts a balanced draft unless its source already has an entry.
    pub async fn post(&self, draft: &JournalDraft) -> DbResult<PostOutcome> {
        draft.ensure_balanced()?;

        if let Some(existing) = self
            .find_by_source(&draft.source_type, &draft.source_id)
            .await?
        {
            debug!(
                source_type = %draft.source_type,
                source_id = %draft.source_id,
                entry_id = %existing.id,
                "Journal entry already posted"
            );
            return Ok(PostOutcome::Existing(existing));
        }

        let id = Uuid::new_v4().to_string();
        let posted_at = Utc::now();

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO journal_entries (id, source_type, source_id, memo, posted_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&id)
        .bind(&draft.source_type)
        .bind(&draft.source_id)
        .bind(&draft.memo)
        .bind(posted_at)
        .execute(&mut *tx)
        .await;

        match inserted.map_err(DbError::from) {
            Ok(_) => {}
            Err(DbError::UniqueViolation { .. }) => {
                tx.rollback().await?;
                let existing = self
                    .find_by_source(&draft.source_type, &draft.source_id)
                    .await?
                    .ok_or_else(|| DbError::not_found("JournalEntry", draft.source_id.clone()))?;
                return Ok(PostOutcome::Existing(existing));
            }
            Err(other) => return Err(other),
        }

        for (line_no, line) in draft.lines.iter().enumerate() {
            sqlx::query(
                "INSERT INTO journal_lines
                    (id, entry_id, line_no, account_code, debit_cents, credit_cents)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&id)
            .bind(line_no as i64)
            .bind(&line.account_code)
            .bind(line.debit_cents)
            .bind(line.credit_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            entry_id = %id,
            source_type = %draft.source_type,
            source_id = %draft.source_id,
            lines = draft.lines.len(),
            "Journal entry posted"
        );

        Ok(PostOutcome::Created(JournalEntry {
            id,
            source_type: draft.source_type.clone(),
            source_id: draft.source_id.clone(),
            memo: draft.memo.clone(),
            posted_at,
            lines: draft.lines.clone(),
        }))
    }

    pub async fn find_by_source(
        &self,
        source_type: &str,
        source_id: &str,
    ) -> DbResult<Option<JournalEntry>> {
        let row = sqlx::query_as::<_, EntryRow>(
            "SELECT id, source_type, source_id, memo, posted_at
             FROM journal_entries
             WHERE source_type = ?1 AND source_id = ?2",
        )
        .bind(source_type)
        .bind(source_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, JournalLine>(
            "SELECT account_code, debit_cents, credit_cents
             FROM journal_lines
             WHERE entry_id = ?1
             ORDER BY line_no",
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(JournalEntry {
            id: row.id,
            source_type: row.source_type,
            source_id: row.source_id,
            memo: row.memo,
            posted_at: row.posted_at,
            lines,
        }))
    }

    pub async fn count_entries(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM journal_entries")
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
    use harbor_core::{CoreError, Money};

    fn map() -> AccountMap {
        AccountMap::new()
            .with("sales_returns", "4100")
            .with("sales_tax_payable", "2200")
            .with("refunds_payable", "2050")
    }

    fn sale_return(id: &str, total: i64, tax: i64) -> SaleReturn {
        SaleReturn {
            id: id.to_string(),
            sale_id: None,
            store_id: "s1".to_string(),
            total_refund_cents: total,
            tax_refund_cents: tax,
            reason: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_post_sale_return_persists_lines_in_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let journal = db.journal();

        let outcome = journal
            .post_sale_return(&sale_return("ret-1", 10825, 825), &map())
            .await
            .unwrap();
        assert!(outcome.was_created());

        let stored = journal
            .find_by_source("sale_return", "ret-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, outcome.entry().id);
        assert_eq!(
            stored.lines,
            vec![
                JournalLine::debit("4100", Money::from_cents(10000)),
                JournalLine::debit("2200", Money::from_cents(825)),
                JournalLine::credit("2050", Money::from_cents(10825)),
            ]
        );
    }

    #[tokio::test]
    async fn test_repeated_source_returns_existing_entry() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let journal = db.journal();
        let r = sale_return("ret-2", 5000, 0);

        let first = journal.post_sale_return(&r, &map()).await.unwrap();
        let second = journal.post_sale_return(&r, &map()).await.unwrap();

        assert!(!second.was_created());
        assert_eq!(first.entry().id, second.entry().id);
        assert_eq!(journal.count_entries().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unbalanced_draft_is_refused() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let draft = JournalDraft {
            source_type: "sale_return".to_string(),
            source_id: "bad".to_string(),
            memo: String::new(),
            lines: vec![JournalLine::debit("4100", Money::from_cents(1))],
        };

        let err = db.journal().post(&draft).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::UnbalancedEntry { .. })));
        assert_eq!(db.journal().count_entries().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_role_surfaces_as_core_error() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .journal()
            .post_sale_return(&sale_return("ret-3", 100, 0), &AccountMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::MissingAccountRole(_))));
    }
}
