//! 过期预留对账
//!
//! 周期性地取消超时未支付的订单，并把每个明细的预留数量退回库存。
//!
//! 每次 tick：
//! 1. `cutoff = now - timeout`
//! 2. 取出 `created_at < cutoff` 的 pending 订单（批量查询失败则中止本次 tick）
//! 3. 逐单条件取消 (`pending → cancelled`)，成功后逐明细退库存
//! 4. 补扫已取消但仍有未退库存明细的订单（上次 tick 在取消与退库存之间中断）
//!
//! 单个订单或明细失败只记录日志，不影响其他订单。

mod scheduler;

pub use scheduler::ReconcileScheduler;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use shared::models::{Order, RestockOutcome};
use thiserror::Error;

use crate::db::{RepoError, ReservationStore};
use crate::utils::time::Clock;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Expired reservation batch fetch failed: {0}")]
    BatchFailed(#[source] RepoError),
    #[error("Cancelling order {order_id} failed: {source}")]
    CancelFailed {
        order_id: i64,
        #[source]
        source: RepoError,
    },
    #[error("Restoring item {item_id} of order {order_id} failed: {source}")]
    ItemRestoreFailed {
        order_id: i64,
        item_id: i64,
        #[source]
        source: RepoError,
    },
}

/// 单次 tick 的统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Expired pending orders fetched
    pub examined: usize,
    pub cancelled: usize,
    /// Orders that left `pending` between fetch and cancel (paid or cancelled elsewhere)
    pub lost_races: usize,
    pub items_restored: usize,
    pub items_already_restored: usize,
    /// Items whose product no longer exists
    pub missing_resources: usize,
    /// Per-order and per-item failures, logged and skipped
    pub failures: usize,
    /// Items restored by the unsettled-cancelled sweep
    pub backlog_healed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Completed(ReconcileReport),
    /// Another tick was still running
    Skipped,
}

/// 过期预留对账器
pub struct ExpiryReconciler {
    store: Arc<dyn ReservationStore>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
    running: tokio::sync::Mutex<()>,
}

impl ExpiryReconciler {
    pub fn new(store: Arc<dyn ReservationStore>, clock: Arc<dyn Clock>, timeout: Duration) -> Self {
        Self {
            store,
            clock,
            timeout,
            running: tokio::sync::Mutex::new(()),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 执行一次对账；已有 tick 在运行时直接返回 `Skipped`
    pub async fn tick(&self) -> Result<TickOutcome, ReconcileError> {
        let Ok(_guard) = self.running.try_lock() else {
            tracing::warn!("Reconcile tick still in progress, skipping");
            return Ok(TickOutcome::Skipped);
        };

        let now = self.clock.now_millis();
        let cutoff = now - self.timeout.as_millis() as i64;
        let mut report = ReconcileReport::default();

        let expired = self.store.find_expired_pending(cutoff).await.map_err(|e| {
            let err = ReconcileError::BatchFailed(e);
            tracing::error!(cutoff, error = %err, "Reconcile tick aborted");
            err
        })?;

        let mut handled = HashSet::with_capacity(expired.len());
        for order in &expired {
            report.examined += 1;
            handled.insert(order.id);
            self.expire_order(order, now, &mut report).await;
        }

        self.sweep_unsettled(cutoff, &handled, &mut report).await;

        if report.examined > 0 || report.backlog_healed > 0 || report.failures > 0 {
            tracing::info!(
                cutoff,
                examined = report.examined,
                cancelled = report.cancelled,
                lost_races = report.lost_races,
                items_restored = report.items_restored,
                missing_resources = report.missing_resources,
                backlog_healed = report.backlog_healed,
                failures = report.failures,
                "Reconcile tick completed"
            );
        } else {
            tracing::debug!(cutoff, "Reconcile tick completed, nothing expired");
        }
        Ok(TickOutcome::Completed(report))
    }

    async fn expire_order(&self, order: &Order, now: i64, report: &mut ReconcileReport) {
        match self.store.cancel_if_pending(order.id, now).await {
            Ok(true) => {
                report.cancelled += 1;
            }
            Ok(false) => {
                // 已被支付或由他处取消
                report.lost_races += 1;
                tracing::info!(order_id = order.id, "Order no longer pending, skipping");
                return;
            }
            Err(source) => {
                report.failures += 1;
                let err = ReconcileError::CancelFailed {
                    order_id: order.id,
                    source,
                };
                tracing::error!(error = %err, "Failed to cancel expired order");
                return;
            }
        }

        let restored = self.restore_items(order, report, false).await;
        tracing::info!(
            order_id = order.id,
            order_no = order.order_no.as_deref().unwrap_or("-"),
            items = order.items.len(),
            restored,
            "Cancelled expired order"
        );
    }

    /// 退回订单中未退库存的明细，返回成功退回数
    async fn restore_items(&self, order: &Order, report: &mut ReconcileReport, backlog: bool) -> usize {
        let mut restored = 0;
        for item in order.unrestocked_items() {
            match self.store.restore_item(item).await {
                Ok(RestockOutcome::Restored {
                    product_id,
                    new_stock,
                }) => {
                    restored += 1;
                    if backlog {
                        report.backlog_healed += 1;
                    } else {
                        report.items_restored += 1;
                    }
                    tracing::debug!(
                        order_id = order.id,
                        item_id = item.id,
                        product_id,
                        quantity = item.quantity,
                        new_stock,
                        "Restocked item"
                    );
                }
                Ok(RestockOutcome::AlreadyRestored) => {
                    report.items_already_restored += 1;
                }
                Ok(RestockOutcome::ResourceMissing { product_id }) => {
                    report.missing_resources += 1;
                    tracing::warn!(
                        order_id = order.id,
                        item_id = item.id,
                        product_id,
                        "Product not found, item skipped"
                    );
                }
                Err(source) => {
                    report.failures += 1;
                    let err = ReconcileError::ItemRestoreFailed {
                        order_id: order.id,
                        item_id: item.id,
                        source,
                    };
                    tracing::error!(error = %err, "Failed to restock item");
                }
            }
        }
        restored
    }

    /// 补偿上次中断的过期取消；宿主自行取消的订单不在此列
    async fn sweep_unsettled(&self, cutoff: i64, handled: &HashSet<i64>, report: &mut ReconcileReport) {
        let orders = match self.store.find_unsettled_cancelled(cutoff).await {
            Ok(orders) => orders,
            Err(e) => {
                tracing::warn!(error = %e, "Unsettled order sweep failed, retrying next tick");
                return;
            }
        };
        for order in orders.iter().filter(|o| !handled.contains(&o.id)) {
            let healed = self.restore_items(order, report, true).await;
            if healed > 0 {
                tracing::warn!(
                    order_id = order.id,
                    healed,
                    "Restocked items left over from an interrupted cancellation"
                );
            }
        }
    }
}
