//! 对账调度器
//!
//! 注册为 `TaskKind::Periodic`，在 `start_background_tasks()` 中启动。
//! 启动后立即执行一次，之后按固定间隔触发；落后的 tick 直接跳过，不会补跑。

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::{ExpiryReconciler, TickOutcome};

pub struct ReconcileScheduler {
    reconciler: Arc<ExpiryReconciler>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl ReconcileScheduler {
    pub fn new(
        reconciler: Arc<ExpiryReconciler>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            reconciler,
            interval,
            shutdown,
        }
    }

    /// 主循环，直到 shutdown 被取消
    pub async fn run(self) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            timeout_secs = self.reconciler.timeout().as_secs(),
            "Reconcile scheduler started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Reconcile scheduler received shutdown signal");
                    break;
                }
                _ = ticker.tick() => {
                    match self.reconciler.tick().await {
                        Ok(TickOutcome::Completed(_)) | Ok(TickOutcome::Skipped) => {}
                        Err(e) => {
                            // 错误不离开任务，下一周期自然重试
                            tracing::warn!(error = %e, "Reconcile tick failed, will retry next period");
                        }
                    }
                }
            }
        }
    }
}
