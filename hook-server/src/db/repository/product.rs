//! Product Repository

use super::{RepoError, RepoResult};
use shared::models::{Product, ProductCreate};
use sqlx::SqlitePool;

pub async fn create(pool: &SqlitePool, data: ProductCreate) -> RepoResult<Product> {
    if data.stock < 0 {
        return Err(RepoError::Validation("stock cannot be negative".into()));
    }
    let now = shared::util::now_millis();
    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO product (name, stock, updated_at) VALUES (?1, ?2, ?3) RETURNING id, name, stock",
    )
    .bind(&data.name)
    .bind(data.stock)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(product)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let product =
        sqlx::query_as::<_, Product>("SELECT id, name, stock FROM product WHERE id = ?1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(product)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM product WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
