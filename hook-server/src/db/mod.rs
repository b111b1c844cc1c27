//! Database Module
//!
//! Handles the SQLite connection pool, migrations, and the store trait
//! implementations backed by it. [`MemoryStore`] implements the same traits
//! without a database.

pub mod memory;
pub mod repository;
pub mod store;

pub use memory::MemoryStore;
pub use repository::{RepoError, RepoResult};
pub use store::{IdentifierStore, ReservationStore};

use crate::utils::AppError;
use async_trait::async_trait;
use shared::models::{Order, OrderCreate, OrderItem, OwnerKind, Product, ProductCreate, RestockOutcome};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;
use std::time::Duration;

/// Database service, owns a SQLite connection pool
#[derive(Clone)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Open (or create) the database file with WAL mode and run migrations
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        // WAL + busy_timeout on every pooled connection: 写冲突时等待 5s 而非立即失败
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| AppError::database(format!("Invalid database path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("foreign_keys", "ON")
            .optimize_on_close(true, None);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        tracing::info!(path = %db_path, "Database connection established (SQLite WAL, busy_timeout=5000ms)");

        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Private in-memory database on a single pinned connection
    pub async fn in_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::database(format!("Invalid database url: {e}")))?
            .pragma("foreign_keys", "ON");

        // Every connection to :memory: is a separate database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;

        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply migrations: {e}")))?;
        tracing::debug!("Database migrations applied");
        Ok(())
    }

    // ========================================================================
    // Host-side operations
    // ========================================================================

    pub async fn create_product(&self, data: ProductCreate) -> RepoResult<Product> {
        repository::product::create(&self.pool, data).await
    }

    pub async fn find_product(&self, id: i64) -> RepoResult<Option<Product>> {
        repository::product::find_by_id(&self.pool, id).await
    }

    pub async fn delete_product(&self, id: i64) -> RepoResult<bool> {
        repository::product::delete(&self.pool, id).await
    }

    pub async fn create_order(&self, data: OrderCreate) -> RepoResult<Order> {
        repository::order::create(&self.pool, data).await
    }

    pub async fn find_order(&self, id: i64) -> RepoResult<Option<Order>> {
        repository::order::find_by_id(&self.pool, id).await
    }

    pub async fn mark_paid(&self, id: i64, at: i64) -> RepoResult<bool> {
        repository::order::mark_paid(&self.pool, id, at).await
    }

    /// Host-side cancel. The reconciler never restocks these.
    pub async fn cancel_order(&self, id: i64, at: i64) -> RepoResult<bool> {
        repository::order::cancel(&self.pool, id, at).await
    }
}

#[async_trait]
impl IdentifierStore for DbService {
    async fn exists(&self, owner: OwnerKind, value: &str) -> RepoResult<bool> {
        repository::identifier::exists(&self.pool, owner, value).await
    }

    async fn claim(&self, owner: OwnerKind, value: &str, at: i64) -> RepoResult<bool> {
        repository::identifier::claim(&self.pool, owner, value, at).await
    }

    async fn register(&self, owner: OwnerKind, value: &str, at: i64) -> RepoResult<()> {
        repository::identifier::register(&self.pool, owner, value, at).await
    }

    async fn count_between(&self, owner: OwnerKind, start: i64, end: i64) -> RepoResult<u64> {
        repository::identifier::count_between(&self.pool, owner, start, end).await
    }

    async fn next_in_bucket(&self, owner: OwnerKind, bucket: &str) -> RepoResult<u64> {
        repository::identifier::next_in_bucket(&self.pool, owner, bucket).await
    }

    async fn release(&self, owner: OwnerKind, value: &str) -> RepoResult<bool> {
        repository::identifier::release(&self.pool, owner, value).await
    }
}

#[async_trait]
impl ReservationStore for DbService {
    async fn find_expired_pending(&self, cutoff: i64) -> RepoResult<Vec<Order>> {
        repository::order::find_expired_pending(&self.pool, cutoff).await
    }

    async fn cancel_if_pending(&self, order_id: i64, at: i64) -> RepoResult<bool> {
        repository::order::cancel_if_pending(&self.pool, order_id, at).await
    }

    async fn find_unsettled_cancelled(&self, cutoff: i64) -> RepoResult<Vec<Order>> {
        repository::order::find_unsettled_cancelled(&self.pool, cutoff).await
    }

    async fn restore_item(&self, item: &OrderItem) -> RepoResult<RestockOutcome> {
        repository::order::restore_item(&self.pool, item).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{OrderItemCreate, OrderStatus};

    async fn test_db() -> DbService {
        DbService::in_memory().await.unwrap()
    }

    async fn product(db: &DbService, name: &str, stock: i64) -> Product {
        db.create_product(ProductCreate {
            name: name.to_string(),
            stock,
        })
        .await
        .unwrap()
    }

    fn order_of(items: &[(i64, i64)], created_at: i64) -> OrderCreate {
        OrderCreate {
            order_no: None,
            created_at: Some(created_at),
            items: items
                .iter()
                .map(|&(product_id, quantity)| OrderItemCreate {
                    product_id,
                    quantity,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_claim_is_insert_if_absent() {
        let db = test_db().await;
        assert!(db.claim(OwnerKind::User, "FTABC", 1).await.unwrap());
        assert!(!db.claim(OwnerKind::User, "FTABC", 2).await.unwrap());
        // Scoped per owner kind
        assert!(db.claim(OwnerKind::Order, "FTABC", 3).await.unwrap());
        assert!(db.exists(OwnerKind::User, "FTABC").await.unwrap());
        assert!(!db.exists(OwnerKind::User, "FTXYZ").await.unwrap());
    }

    #[tokio::test]
    async fn test_register_duplicate_is_reported() {
        let db = test_db().await;
        db.register(OwnerKind::Order, "ORD20260101001", 10).await.unwrap();
        let err = db
            .register(OwnerKind::Order, "ORD20260101001", 11)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_count_between_is_inclusive() {
        let db = test_db().await;
        for (value, at) in [("a", 100), ("b", 150), ("c", 200), ("d", 201)] {
            db.register(OwnerKind::Order, value, at).await.unwrap();
        }
        db.register(OwnerKind::User, "e", 150).await.unwrap();
        assert_eq!(db.count_between(OwnerKind::Order, 100, 200).await.unwrap(), 3);
        assert_eq!(db.count_between(OwnerKind::Order, 101, 199).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_next_in_bucket_counts_per_bucket() {
        let db = test_db().await;
        assert_eq!(db.next_in_bucket(OwnerKind::Order, "20260101").await.unwrap(), 1);
        assert_eq!(db.next_in_bucket(OwnerKind::Order, "20260101").await.unwrap(), 2);
        assert_eq!(db.next_in_bucket(OwnerKind::Order, "20260102").await.unwrap(), 1);
        assert_eq!(db.next_in_bucket(OwnerKind::User, "20260101").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_order_reserves_stock() {
        let db = test_db().await;
        let a = product(&db, "Tea", 10).await;
        let b = product(&db, "Cake", 20).await;

        let order = db.create_order(order_of(&[(a.id, 2), (b.id, 5)], 1_000)).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 2);
        assert!(order.items.iter().all(|i| !i.restocked));

        assert_eq!(db.find_product(a.id).await.unwrap().unwrap().stock, 8);
        assert_eq!(db.find_product(b.id).await.unwrap().unwrap().stock, 15);
    }

    #[tokio::test]
    async fn test_create_order_insufficient_stock_rolls_back() {
        let db = test_db().await;
        let a = product(&db, "Tea", 10).await;
        let b = product(&db, "Cake", 1).await;

        let err = db
            .create_order(order_of(&[(a.id, 2), (b.id, 5)], 1_000))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        // First item's decrement was rolled back
        assert_eq!(db.find_product(a.id).await.unwrap().unwrap().stock, 10);
        assert!(db.find_expired_pending(i64::MAX).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expired_pending_uses_strict_cutoff() {
        let db = test_db().await;
        let a = product(&db, "Tea", 10).await;
        let old = db.create_order(order_of(&[(a.id, 1)], 999)).await.unwrap();
        db.create_order(order_of(&[(a.id, 1)], 1_000)).await.unwrap();
        let paid = db.create_order(order_of(&[(a.id, 1)], 500)).await.unwrap();
        assert!(db.mark_paid(paid.id, 600).await.unwrap());

        let expired = db.find_expired_pending(1_000).await.unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, old.id);
        assert_eq!(expired[0].items.len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_if_pending_is_conditional() {
        let db = test_db().await;
        let a = product(&db, "Tea", 10).await;
        let order = db.create_order(order_of(&[(a.id, 1)], 1)).await.unwrap();

        assert!(db.cancel_if_pending(order.id, 10).await.unwrap());
        assert!(!db.cancel_if_pending(order.id, 11).await.unwrap());
        assert!(!db.mark_paid(order.id, 12).await.unwrap());
        let stored = db.find_order(order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Cancelled);
        assert_eq!(stored.expired_at, Some(10));
    }

    #[tokio::test]
    async fn test_restore_item_once() {
        let db = test_db().await;
        let a = product(&db, "Tea", 10).await;
        let order = db.create_order(order_of(&[(a.id, 3)], 1)).await.unwrap();
        db.cancel_if_pending(order.id, 2).await.unwrap();

        let item = &order.items[0];
        assert_eq!(
            db.restore_item(item).await.unwrap(),
            RestockOutcome::Restored {
                product_id: a.id,
                new_stock: 10
            }
        );
        assert_eq!(db.restore_item(item).await.unwrap(), RestockOutcome::AlreadyRestored);
        assert_eq!(db.find_product(a.id).await.unwrap().unwrap().stock, 10);
    }

    #[tokio::test]
    async fn test_restore_item_missing_product() {
        let db = test_db().await;
        let a = product(&db, "Tea", 10).await;
        let order = db.create_order(order_of(&[(a.id, 3)], 1)).await.unwrap();
        db.cancel_if_pending(order.id, 2).await.unwrap();
        assert!(db.delete_product(a.id).await.unwrap());

        assert_eq!(
            db.restore_item(&order.items[0]).await.unwrap(),
            RestockOutcome::ResourceMissing { product_id: a.id }
        );
        // Flagged, so it no longer shows up as unsettled
        assert!(db.find_unsettled_cancelled(i64::MAX).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsettled_cancelled_lists_partial_restocks() {
        let db = test_db().await;
        let a = product(&db, "Tea", 10).await;
        let b = product(&db, "Cake", 10).await;
        let order = db.create_order(order_of(&[(a.id, 1), (b.id, 2)], 1)).await.unwrap();
        db.cancel_if_pending(order.id, 2).await.unwrap();
        db.restore_item(&order.items[0]).await.unwrap();

        let unsettled = db.find_unsettled_cancelled(100).await.unwrap();
        assert_eq!(unsettled.len(), 1);
        let pending: Vec<i64> = unsettled[0].unrestocked_items().map(|i| i.id).collect();
        assert_eq!(pending, vec![order.items[1].id]);
        // Cutoff still applies
        assert!(db.find_unsettled_cancelled(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_host_cancelled_order_is_not_unsettled() {
        let db = test_db().await;
        let a = product(&db, "Tea", 10).await;
        let order = db.create_order(order_of(&[(a.id, 3)], 1)).await.unwrap();
        assert!(db.cancel_order(order.id, 2).await.unwrap());

        let found = db.find_order(order.id).await.unwrap().unwrap();
        assert_eq!(found.status, OrderStatus::Cancelled);
        assert_eq!(found.expired_at, None);
        assert!(db.find_unsettled_cancelled(i64::MAX).await.unwrap().is_empty());
        // Expiry cancel no longer applies either
        assert!(!db.cancel_if_pending(order.id, 3).await.unwrap());
    }

    #[tokio::test]
    async fn test_release_frees_claimed_identifier() {
        let db = test_db().await;
        assert!(db.claim(OwnerKind::Order, "ORD20260101001", 5).await.unwrap());
        assert_eq!(db.count_between(OwnerKind::Order, 0, 10).await.unwrap(), 1);

        assert!(db.release(OwnerKind::Order, "ORD20260101001").await.unwrap());
        assert!(!db.release(OwnerKind::Order, "ORD20260101001").await.unwrap());
        assert_eq!(db.count_between(OwnerKind::Order, 0, 10).await.unwrap(), 0);
        assert!(db.claim(OwnerKind::Order, "ORD20260101001", 6).await.unwrap());
    }

    #[tokio::test]
    async fn test_file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hooks.db");
        let path = path.to_str().unwrap();

        {
            let db = DbService::new(path).await.unwrap();
            db.register(OwnerKind::User, "FT1", 1).await.unwrap();
            db.pool.close().await;
        }

        let db = DbService::new(path).await.unwrap();
        assert!(db.exists(OwnerKind::User, "FT1").await.unwrap());
    }
}
