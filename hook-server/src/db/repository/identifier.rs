//! Identifier Repository

use super::RepoResult;
use shared::models::OwnerKind;
use sqlx::SqlitePool;

pub async fn exists(pool: &SqlitePool, owner: OwnerKind, value: &str) -> RepoResult<bool> {
    let found = sqlx::query_scalar::<_, i64>(
        "SELECT EXISTS(SELECT 1 FROM identifier WHERE owner = ?1 AND value = ?2)",
    )
    .bind(owner.as_str())
    .bind(value)
    .fetch_one(pool)
    .await?;
    Ok(found != 0)
}

/// Insert-if-absent; the primary key makes the check and the write one statement
pub async fn claim(pool: &SqlitePool, owner: OwnerKind, value: &str, at: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "INSERT INTO identifier (owner, value, created_at) VALUES (?1, ?2, ?3) ON CONFLICT (owner, value) DO NOTHING",
    )
    .bind(owner.as_str())
    .bind(value)
    .bind(at)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() == 1)
}

pub async fn register(pool: &SqlitePool, owner: OwnerKind, value: &str, at: i64) -> RepoResult<()> {
    sqlx::query("INSERT INTO identifier (owner, value, created_at) VALUES (?1, ?2, ?3)")
        .bind(owner.as_str())
        .bind(value)
        .bind(at)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn count_between(
    pool: &SqlitePool,
    owner: OwnerKind,
    start: i64,
    end: i64,
) -> RepoResult<u64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM identifier WHERE owner = ?1 AND created_at >= ?2 AND created_at <= ?3",
    )
    .bind(owner.as_str())
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await?;
    Ok(count.max(0) as u64)
}

pub async fn release(pool: &SqlitePool, owner: OwnerKind, value: &str) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM identifier WHERE owner = ?1 AND value = ?2")
        .bind(owner.as_str())
        .bind(value)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() == 1)
}

/// Atomically increment the `(owner, bucket)` counter and return the new value
pub async fn next_in_bucket(pool: &SqlitePool, owner: OwnerKind, bucket: &str) -> RepoResult<u64> {
    let now = shared::util::now_millis();
    let value = sqlx::query_scalar::<_, i64>(
        "INSERT INTO sequence_counter (owner, bucket, value, updated_at) VALUES (?1, ?2, 1, ?3) \
         ON CONFLICT (owner, bucket) DO UPDATE SET value = value + 1, updated_at = ?3 \
         RETURNING value",
    )
    .bind(owner.as_str())
    .bind(bucket)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(value.max(0) as u64)
}
