//! Store traits
//!
//! The seam between the hooks/reconciler and whatever persistence the host
//! provides. Every method is a single round-trip; the conditional ones
//! (`claim`, `next_in_bucket`, `cancel_if_pending`, `restore_item`) must be
//! atomic in the implementation.

use async_trait::async_trait;
use shared::models::{Order, OrderItem, OwnerKind, RestockOutcome};

use super::repository::RepoResult;

/// Identifier lookups, reservations and per-day counters
#[async_trait]
pub trait IdentifierStore: Send + Sync {
    /// Whether a record of `owner` already holds `value`
    async fn exists(&self, owner: OwnerKind, value: &str) -> RepoResult<bool>;

    /// Insert `value` if absent. Returns `true` iff this call inserted it.
    async fn claim(&self, owner: OwnerKind, value: &str, at: i64) -> RepoResult<bool>;

    /// Record an identifier persisted by the host. `Duplicate` on conflict.
    async fn register(&self, owner: OwnerKind, value: &str, at: i64) -> RepoResult<()>;

    /// Count identifiers of `owner` created within `[start, end]` (inclusive)
    async fn count_between(&self, owner: OwnerKind, start: i64, end: i64) -> RepoResult<u64>;

    /// Atomically increment and return the counter for `(owner, bucket)`, starting at 1
    async fn next_in_bucket(&self, owner: OwnerKind, bucket: &str) -> RepoResult<u64>;

    /// Drop a claimed identifier whose record was never inserted.
    /// Returns `false` if it was not held. Counter values are not rewound,
    /// so atomic-counter sequences keep the gap.
    async fn release(&self, owner: OwnerKind, value: &str) -> RepoResult<bool>;
}

/// Reservation expiry operations
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Pending orders with `created_at < cutoff`, items included
    async fn find_expired_pending(&self, cutoff: i64) -> RepoResult<Vec<Order>>;

    /// `pending → cancelled`, stamping `expired_at = at`.
    /// Returns `false` when the order is no longer pending.
    async fn cancel_if_pending(&self, order_id: i64, at: i64) -> RepoResult<bool>;

    /// Orders cancelled by `cancel_if_pending` (so `expired_at` is set), created
    /// before `cutoff`, that still hold un-restocked items. Orders the host
    /// cancelled itself are never returned.
    async fn find_unsettled_cancelled(&self, cutoff: i64) -> RepoResult<Vec<Order>>;

    /// Flag the item restocked and return its quantity to the product, as one unit
    async fn restore_item(&self, item: &OrderItem) -> RepoResult<RestockOutcome>;
}
