//! In-memory store
//!
//! Implements [`IdentifierStore`] and [`ReservationStore`] over a single
//! `parking_lot::Mutex`, so every trait method is atomic. Used by tests and by
//! hosts that keep their records elsewhere. Failure injection hooks let tests
//! exercise the error paths.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use shared::models::{
    Order, OrderCreate, OrderItem, OrderStatus, OwnerKind, Product, ProductCreate, RestockOutcome,
};

use super::repository::{RepoError, RepoResult};
use super::store::{IdentifierStore, ReservationStore};

#[derive(Default)]
struct Inner {
    /// (owner, value) -> created_at
    identifiers: HashMap<(OwnerKind, String), i64>,
    counters: HashMap<(OwnerKind, String), u64>,
    products: HashMap<i64, Product>,
    orders: HashMap<i64, Order>,
    next_product_id: i64,
    next_order_id: i64,
    next_item_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    unavailable: AtomicBool,
    failing_items: Mutex<HashSet<i64>>,
    failing_cancels: Mutex<HashSet<i64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Failure injection
    // ========================================================================

    /// Make every store call fail with a database error
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make `restore_item` fail for this item id
    pub fn fail_restore_of(&self, item_id: i64) {
        self.failing_items.lock().insert(item_id);
    }

    /// Make `cancel_if_pending` fail for this order id
    pub fn fail_cancel_of(&self, order_id: i64) {
        self.failing_cancels.lock().insert(order_id);
    }

    pub fn clear_failures(&self) {
        self.set_unavailable(false);
        self.failing_items.lock().clear();
        self.failing_cancels.lock().clear();
    }

    fn check_available(&self) -> RepoResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepoError::Database("store unavailable".into()));
        }
        Ok(())
    }

    // ========================================================================
    // Host-side operations
    // ========================================================================

    pub fn create_product(&self, data: ProductCreate) -> RepoResult<Product> {
        self.check_available()?;
        if data.stock < 0 {
            return Err(RepoError::Validation("stock cannot be negative".into()));
        }
        let mut inner = self.inner.lock();
        inner.next_product_id += 1;
        let product = Product {
            id: inner.next_product_id,
            name: data.name,
            stock: data.stock,
        };
        inner.products.insert(product.id, product.clone());
        Ok(product)
    }

    pub fn find_product(&self, id: i64) -> Option<Product> {
        self.inner.lock().products.get(&id).cloned()
    }

    pub fn delete_product(&self, id: i64) -> bool {
        self.inner.lock().products.remove(&id).is_some()
    }

    /// Create a pending order, reserving stock for all items or none
    pub fn create_order(&self, data: OrderCreate) -> RepoResult<Order> {
        self.check_available()?;
        let mut inner = self.inner.lock();

        // Validate everything before touching stock
        let mut needed: HashMap<i64, i64> = HashMap::new();
        for item in &data.items {
            if item.quantity <= 0 {
                return Err(RepoError::Validation(format!(
                    "quantity must be positive (product {})",
                    item.product_id
                )));
            }
            *needed.entry(item.product_id).or_default() += item.quantity;
        }
        for (product_id, quantity) in &needed {
            let stock = inner.products.get(product_id).map(|p| p.stock).unwrap_or(0);
            if stock < *quantity {
                return Err(RepoError::Validation(format!(
                    "insufficient stock for product {}",
                    product_id
                )));
            }
        }
        for (product_id, quantity) in &needed {
            if let Some(product) = inner.products.get_mut(product_id) {
                product.stock -= quantity;
            }
        }

        inner.next_order_id += 1;
        let order_id = inner.next_order_id;
        let mut items = Vec::with_capacity(data.items.len());
        for item in &data.items {
            inner.next_item_id += 1;
            items.push(OrderItem {
                id: inner.next_item_id,
                order_id,
                product_id: item.product_id,
                quantity: item.quantity,
                restocked: false,
            });
        }

        let order = Order {
            id: order_id,
            order_no: data.order_no,
            status: OrderStatus::Pending,
            created_at: data.created_at.unwrap_or_else(shared::util::now_millis),
            expired_at: None,
            items,
        };
        inner.orders.insert(order_id, order.clone());
        Ok(order)
    }

    pub fn find_order(&self, id: i64) -> Option<Order> {
        self.inner.lock().orders.get(&id).cloned()
    }

    /// `pending → paid`; `false` if the order was not pending
    pub fn mark_paid(&self, id: i64) -> bool {
        let mut inner = self.inner.lock();
        match inner.orders.get_mut(&id) {
            Some(order) if order.status == OrderStatus::Pending => {
                order.status = OrderStatus::Paid;
                true
            }
            _ => false,
        }
    }

    /// Host cancellation: `pending → cancelled` without the expiry stamp
    pub fn cancel(&self, id: i64) -> bool {
        let mut inner = self.inner.lock();
        match inner.orders.get_mut(&id) {
            Some(order) if order.status == OrderStatus::Pending => {
                order.status = OrderStatus::Cancelled;
                true
            }
            _ => false,
        }
    }

    /// Identifiers currently held by `owner`, unordered
    pub fn identifiers(&self, owner: OwnerKind) -> Vec<String> {
        self.inner
            .lock()
            .identifiers
            .keys()
            .filter(|(o, _)| *o == owner)
            .map(|(_, v)| v.clone())
            .collect()
    }
}

#[async_trait]
impl IdentifierStore for MemoryStore {
    async fn exists(&self, owner: OwnerKind, value: &str) -> RepoResult<bool> {
        self.check_available()?;
        Ok(self
            .inner
            .lock()
            .identifiers
            .contains_key(&(owner, value.to_string())))
    }

    async fn claim(&self, owner: OwnerKind, value: &str, at: i64) -> RepoResult<bool> {
        self.check_available()?;
        let mut inner = self.inner.lock();
        let key = (owner, value.to_string());
        if inner.identifiers.contains_key(&key) {
            return Ok(false);
        }
        inner.identifiers.insert(key, at);
        Ok(true)
    }

    async fn register(&self, owner: OwnerKind, value: &str, at: i64) -> RepoResult<()> {
        if self.claim(owner, value, at).await? {
            Ok(())
        } else {
            Err(RepoError::Duplicate(format!("{} {}", owner, value)))
        }
    }

    async fn count_between(&self, owner: OwnerKind, start: i64, end: i64) -> RepoResult<u64> {
        self.check_available()?;
        let inner = self.inner.lock();
        let count = inner
            .identifiers
            .iter()
            .filter(|((o, _), at)| *o == owner && **at >= start && **at <= end)
            .count();
        Ok(count as u64)
    }

    async fn next_in_bucket(&self, owner: OwnerKind, bucket: &str) -> RepoResult<u64> {
        self.check_available()?;
        let mut inner = self.inner.lock();
        let counter = inner.counters.entry((owner, bucket.to_string())).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn release(&self, owner: OwnerKind, value: &str) -> RepoResult<bool> {
        self.check_available()?;
        Ok(self
            .inner
            .lock()
            .identifiers
            .remove(&(owner, value.to_string()))
            .is_some())
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn find_expired_pending(&self, cutoff: i64) -> RepoResult<Vec<Order>> {
        self.check_available()?;
        let inner = self.inner.lock();
        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|o| o.status == OrderStatus::Pending && o.created_at < cutoff)
            .cloned()
            .collect();
        orders.sort_by_key(|o| (o.created_at, o.id));
        Ok(orders)
    }

    async fn cancel_if_pending(&self, order_id: i64, at: i64) -> RepoResult<bool> {
        self.check_available()?;
        if self.failing_cancels.lock().contains(&order_id) {
            return Err(RepoError::Database(format!("cancel of order {} failed", order_id)));
        }
        let mut inner = self.inner.lock();
        match inner.orders.get_mut(&order_id) {
            Some(order) if order.status == OrderStatus::Pending => {
                order.status = OrderStatus::Cancelled;
                order.expired_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_unsettled_cancelled(&self, cutoff: i64) -> RepoResult<Vec<Order>> {
        self.check_available()?;
        let inner = self.inner.lock();
        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|o| {
                o.status == OrderStatus::Cancelled
                    && o.expired_at.is_some()
                    && o.created_at < cutoff
                    && o.items.iter().any(|i| !i.restocked)
            })
            .cloned()
            .collect();
        orders.sort_by_key(|o| (o.created_at, o.id));
        Ok(orders)
    }

    async fn restore_item(&self, item: &OrderItem) -> RepoResult<RestockOutcome> {
        self.check_available()?;
        if self.failing_items.lock().contains(&item.id) {
            return Err(RepoError::Database(format!("restore of item {} failed", item.id)));
        }
        let mut inner = self.inner.lock();
        let stored = inner
            .orders
            .get_mut(&item.order_id)
            .and_then(|o| o.items.iter_mut().find(|i| i.id == item.id))
            .ok_or_else(|| RepoError::NotFound(format!("order item {}", item.id)))?;
        if stored.restocked {
            return Ok(RestockOutcome::AlreadyRestored);
        }
        stored.restocked = true;
        let quantity = stored.quantity;
        let product_id = stored.product_id;

        Ok(match inner.products.get_mut(&product_id) {
            Some(product) => {
                product.stock += quantity;
                RestockOutcome::Restored {
                    product_id,
                    new_stock: product.stock,
                }
            }
            None => RestockOutcome::ResourceMissing { product_id },
        })
    }
}
