//! # Store Repository
//!
//! Stores, back-office users and the `store_user` membership table the
//! session guard checks against. The guard only reads; the write methods
//! exist for seeding and administration.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use harbor_core::session::{StoreAccess, StoreMembership};
use harbor_core::Store;

#[derive(Debug, Clone)]
pub struct StoreRepository {
    pool: SqlitePool,
}

impl StoreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StoreRepository { pool }
    }

    pub async fn insert_store(&self, store: &Store) -> DbResult<()> {
        debug!(id = %store.id, code = %store.code, "Inserting store");

        sqlx::query(
            "INSERT INTO stores (id, name, code, is_active, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&store.id)
        .bind(&store.name)
        .bind(&store.code)
        .bind(store.is_active)
        .bind(store.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_store(&self, id: &str) -> DbResult<Option<Store>> {
        let store = sqlx::query_as::<_, Store>(
            "SELECT id, name, code, is_active, created_at FROM stores WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(store)
    }

    /// Flips a store's active flag. Returns false if no such store.
    pub async fn set_active(&self, id: &str, is_active: bool) -> DbResult<bool> {
        debug!(id = %id, is_active, "Updating store active flag");
        let result = sqlx::query("UPDATE stores SET is_active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(is_active)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn insert_user(&self, id: &str, name: &str, email: &str) -> DbResult<()> {
        debug!(id = %id, "Inserting user");
        sqlx::query("INSERT INTO users (id, name, email, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(id)
            .bind(name)
            .bind(email)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Attaches a user to a store. Attaching twice is a no-op.
    pub async fn add_member(&self, store_id: &str, user_id: &str) -> DbResult<()> {
        debug!(store_id = %store_id, user_id = %user_id, "Adding store member");
        sqlx::query(
            "INSERT OR IGNORE INTO store_user (store_id, user_id, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(store_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn remove_member(&self, store_id: &str, user_id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM store_user WHERE store_id = ?1 AND user_id = ?2")
            .bind(store_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All of a user's stores, active or not, ordered by code.
    pub async fn memberships(&self, user_id: &str) -> DbResult<Vec<StoreMembership>> {
        let memberships = sqlx::query_as::<_, StoreMembership>(
            "SELECT s.id AS store_id, s.name, s.code, s.is_active
             FROM store_user su
             JOIN stores s ON s.id = su.store_id
             WHERE su.user_id = ?1
             ORDER BY s.code",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(memberships)
    }

    /// Membership snapshot for the session guard. An unknown user simply
    /// has no stores.
    pub async fn store_access(&self, user_id: &str) -> DbResult<StoreAccess> {
        let memberships = self.memberships(user_id).await?;
        debug!(user_id = %user_id, stores = memberships.len(), "Loaded store access");
        Ok(StoreAccess {
            user_id: user_id.to_string(),
            memberships,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn store(id: &str, code: &str, active: bool) -> Store {
        Store {
            id: id.to_string(),
            name: format!("Store {code}"),
            code: code.to_string(),
            is_active: active,
            created_at: Utc::now(),
        }
    }

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let stores = db.stores();
        stores.insert_store(&store("s1", "A-01", true)).await.unwrap();
        stores.insert_store(&store("s2", "B-02", true)).await.unwrap();
        stores.insert_store(&store("s3", "C-03", false)).await.unwrap();
        stores.insert_user("u1", "Grace", "grace@example.com").await.unwrap();
        stores.add_member("s1", "u1").await.unwrap();
        stores.add_member("s3", "u1").await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_store_access_lists_memberships_with_flags() {
        let db = setup().await;
        let access = db.stores().store_access("u1").await.unwrap();

        assert_eq!(access.user_id, "u1");
        let ids: Vec<_> = access.memberships.iter().map(|m| m.store_id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s3"]);
        assert!(access.check("s1").is_ok());
        assert!(access.check("s2").is_err());
        assert!(access.check("s3").is_err());
    }

    #[tokio::test]
    async fn test_deactivation_is_visible_to_access() {
        let db = setup().await;
        assert!(db.stores().set_active("s1", false).await.unwrap());

        let access = db.stores().store_access("u1").await.unwrap();
        assert_eq!(access.selectable().count(), 0);
        assert!(!db.stores().get_store("s1").await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn test_add_member_twice_is_noop() {
        let db = setup().await;
        db.stores().add_member("s1", "u1").await.unwrap();
        assert_eq!(db.stores().memberships("u1").await.unwrap().len(), 2);

        assert!(db.stores().remove_member("s1", "u1").await.unwrap());
        assert_eq!(db.stores().memberships("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_user_has_no_stores() {
        let db = setup().await;
        let access = db.stores().store_access("nobody").await.unwrap();
        assert!(access.memberships.is_empty());
    }
}
