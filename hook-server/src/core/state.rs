use std::sync::Arc;

use shared::models::OwnerKind;

use crate::allocator::{IdentifierAllocator, UniquenessStrategy};
use crate::core::Config;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::db::{DbService, IdentifierStore, RepoResult, ReservationStore};
use crate::hooks::{CreatePayload, HookRegistry, HookResult, IdentifierHook};
use crate::reconcile::{ExpiryReconciler, ReconcileScheduler};
use crate::utils::AppResult;
use crate::utils::time::{Clock, SystemClock};

/// 服务状态 - 持有分配器、钩子注册表和对账器的共享引用
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | allocator | 标识分配器 |
/// | hooks | 创建前钩子 (user_id / order_no) |
/// | reconciler | 过期预留对账器 |
#[derive(Clone)]
pub struct HookState {
    pub config: Config,
    pub identifiers: Arc<dyn IdentifierStore>,
    pub clock: Arc<dyn Clock>,
    pub allocator: Arc<IdentifierAllocator>,
    pub hooks: Arc<HookRegistry>,
    pub reconciler: Arc<ExpiryReconciler>,
}

impl HookState {
    /// 打开 SQLite 数据库并组装全部组件
    pub async fn initialize(config: &Config) -> AppResult<(Self, DbService)> {
        if let Some(parent) = std::path::Path::new(&config.database_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let db = DbService::new(&config.database_path).await?;
        let store = Arc::new(db.clone());
        let state = Self::with_store(config, store, Arc::new(SystemClock));
        Ok((state, db))
    }

    /// 使用任意存储实现组装（测试使用 `MemoryStore`）
    pub fn with_store<S>(config: &Config, store: Arc<S>, clock: Arc<dyn Clock>) -> Self
    where
        S: IdentifierStore + ReservationStore + 'static,
    {
        let allocator = Arc::new(IdentifierAllocator::new(
            store.clone(),
            clock.clone(),
            config.business_day(),
            config.strategy,
            config.allocation_policy(),
        ));

        let mut hooks = HookRegistry::new();
        hooks.subscribe(
            OwnerKind::User,
            Arc::new(IdentifierHook::user_id(
                allocator.clone(),
                config.user_id_prefix.clone(),
            )),
        );
        hooks.subscribe(
            OwnerKind::Order,
            Arc::new(IdentifierHook::order_number(
                allocator.clone(),
                config.order_no_prefix.clone(),
                config.order_sequence_source,
            )),
        );

        let reconciler = Arc::new(ExpiryReconciler::new(
            store.clone(),
            clock.clone(),
            config.reservation_timeout(),
        ));

        Self {
            config: config.clone(),
            identifiers: store,
            clock,
            allocator,
            hooks: Arc::new(hooks),
            reconciler,
        }
    }

    /// 插入前调用；失败时宿主必须放弃本次插入
    pub async fn before_create(&self, model: OwnerKind, payload: &mut CreatePayload) -> HookResult<()> {
        self.hooks.run_before_create(model, payload).await
    }

    /// 插入成功后调用
    ///
    /// `ReserveIfAbsent` 已在分配时登记，这里什么也不做；`CheckThenAccept`
    /// 在此登记，返回 `Duplicate` 表示并发分配撞号。
    pub async fn after_create(&self, model: OwnerKind, value: &str) -> RepoResult<()> {
        match self.allocator.strategy() {
            UniquenessStrategy::ReserveIfAbsent => Ok(()),
            UniquenessStrategy::CheckThenAccept => {
                self.identifiers
                    .register(model, value, self.clock.now_millis())
                    .await
            }
        }
    }

    /// 宿主插入失败后调用，释放 `before_create` 占用的标识
    ///
    /// `CheckThenAccept` 尚未登记，无需处理。原子计数器不会回退，
    /// 因此被释放的序号会留下空号。
    pub async fn create_failed(&self, model: OwnerKind, value: &str) -> RepoResult<()> {
        if self.allocator.strategy() == UniquenessStrategy::CheckThenAccept {
            return Ok(());
        }
        if self.identifiers.release(model, value).await? {
            tracing::debug!(model = %model, value = %value, "Released identifier after failed create");
        } else {
            tracing::warn!(model = %model, value = %value, "Failed create reported for an identifier that was not held");
        }
        Ok(())
    }

    /// 启动后台任务
    ///
    /// - ReconcileScheduler (Periodic)
    pub fn start_background_tasks(&self, tasks: &mut BackgroundTasks) {
        let scheduler = ReconcileScheduler::new(
            self.reconciler.clone(),
            self.config.reconcile_interval(),
            tasks.shutdown_token(),
        );
        tasks.spawn("reconcile_scheduler", TaskKind::Periodic, scheduler.run());
        self.hooks.log_ready();
        tasks.log_summary();
    }
}
