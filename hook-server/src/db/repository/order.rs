//! Order Repository
//!
//! Orders double as stock reservations: creating one decrements product
//! stock, and expiring one gives it back item by item.

use super::{RepoError, RepoResult};
use shared::models::{Order, OrderCreate, OrderItem, OrderStatus, RestockOutcome};
use sqlx::SqlitePool;

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_no: Option<String>,
    status: String,
    created_at: i64,
    expired_at: Option<i64>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> RepoResult<Order> {
        let status = self
            .status
            .parse::<OrderStatus>()
            .map_err(RepoError::Validation)?;
        Ok(Order {
            id: self.id,
            order_no: self.order_no,
            status,
            created_at: self.created_at,
            expired_at: self.expired_at,
            items,
        })
    }
}

async fn load_items(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT id, order_id, product_id, quantity, restocked FROM order_item WHERE order_id = ?1 ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

async fn with_items(pool: &SqlitePool, rows: Vec<OrderRow>) -> RepoResult<Vec<Order>> {
    let mut orders = Vec::with_capacity(rows.len());
    for row in rows {
        let items = load_items(pool, row.id).await?;
        orders.push(row.into_order(items)?);
    }
    Ok(orders)
}

/// Create a pending order, reserving stock for every item atomically.
///
/// Fails with `Validation` (and writes nothing) when any product is missing
/// or lacks stock.
pub async fn create(pool: &SqlitePool, data: OrderCreate) -> RepoResult<Order> {
    let now = shared::util::now_millis();
    let created_at = data.created_at.unwrap_or(now);
    let mut tx = pool.begin().await?;

    let order_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO orders (order_no, status, created_at, updated_at) VALUES (?1, 'pending', ?2, ?3) RETURNING id",
    )
    .bind(&data.order_no)
    .bind(created_at)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    let mut items = Vec::with_capacity(data.items.len());
    for item in &data.items {
        if item.quantity <= 0 {
            return Err(RepoError::Validation(format!(
                "quantity must be positive (product {})",
                item.product_id
            )));
        }
        // Conditional decrement: never read-modify-write
        let reserved = sqlx::query(
            "UPDATE product SET stock = stock - ?1, updated_at = ?2 WHERE id = ?3 AND stock >= ?1",
        )
        .bind(item.quantity)
        .bind(now)
        .bind(item.product_id)
        .execute(&mut *tx)
        .await?;
        if reserved.rows_affected() == 0 {
            return Err(RepoError::Validation(format!(
                "insufficient stock for product {}",
                item.product_id
            )));
        }

        let row = sqlx::query_as::<_, OrderItem>(
            "INSERT INTO order_item (order_id, product_id, quantity, restocked) VALUES (?1, ?2, ?3, 0) \
             RETURNING id, order_id, product_id, quantity, restocked",
        )
        .bind(order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .fetch_one(&mut *tx)
        .await?;
        items.push(row);
    }

    tx.commit().await?;

    Ok(Order {
        id: order_id,
        order_no: data.order_no,
        status: OrderStatus::Pending,
        created_at,
        expired_at: None,
        items,
    })
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, OrderRow>(
        "SELECT id, order_no, status, created_at, expired_at FROM orders WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    match row {
        Some(row) => {
            let items = load_items(pool, row.id).await?;
            Ok(Some(row.into_order(items)?))
        }
        None => Ok(None),
    }
}

/// `pending → paid`; `false` if the order was not pending
pub async fn mark_paid(pool: &SqlitePool, id: i64, at: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE orders SET status = 'paid', updated_at = ?1 WHERE id = ?2 AND status = 'pending'",
    )
    .bind(at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() == 1)
}

pub async fn find_expired_pending(pool: &SqlitePool, cutoff: i64) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT id, order_no, status, created_at, expired_at FROM orders \
         WHERE status = 'pending' AND created_at < ?1 ORDER BY created_at, id",
    )
    .bind(cutoff)
    .fetch_all(pool)
    .await?;
    with_items(pool, rows).await
}

/// Expiry cancellation: `pending → cancelled` and stamps `expired_at`
pub async fn cancel_if_pending(pool: &SqlitePool, id: i64, at: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE orders SET status = 'cancelled', expired_at = ?1, updated_at = ?1 WHERE id = ?2 AND status = 'pending'",
    )
    .bind(at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() == 1)
}

/// Host cancellation; restocking is the host's own business
pub async fn cancel(pool: &SqlitePool, id: i64, at: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE orders SET status = 'cancelled', updated_at = ?1 WHERE id = ?2 AND status = 'pending'",
    )
    .bind(at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() == 1)
}

/// Expiry-cancelled orders that still hold unflagged items
pub async fn find_unsettled_cancelled(pool: &SqlitePool, cutoff: i64) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT o.id, o.order_no, o.status, o.created_at, o.expired_at FROM orders o \
         WHERE o.status = 'cancelled' AND o.expired_at IS NOT NULL AND o.created_at < ?1 \
         AND EXISTS (SELECT 1 FROM order_item i WHERE i.order_id = o.id AND i.restocked = 0) \
         ORDER BY o.created_at, o.id",
    )
    .bind(cutoff)
    .fetch_all(pool)
    .await?;
    with_items(pool, rows).await
}

/// Flag the item and return its quantity to stock in one transaction
pub async fn restore_item(pool: &SqlitePool, item: &OrderItem) -> RepoResult<RestockOutcome> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let flagged = sqlx::query("UPDATE order_item SET restocked = 1 WHERE id = ?1 AND restocked = 0")
        .bind(item.id)
        .execute(&mut *tx)
        .await?;
    if flagged.rows_affected() == 0 {
        return Ok(RestockOutcome::AlreadyRestored);
    }

    let new_stock = sqlx::query_scalar::<_, i64>(
        "UPDATE product SET stock = stock + ?1, updated_at = ?2 WHERE id = ?3 RETURNING stock",
    )
    .bind(item.quantity)
    .bind(now)
    .bind(item.product_id)
    .fetch_optional(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(match new_stock {
        Some(new_stock) => RestockOutcome::Restored {
            product_id: item.product_id,
            new_stock,
        },
        None => RestockOutcome::ResourceMissing {
            product_id: item.product_id,
        },
    })
}
