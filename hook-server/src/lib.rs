//! Hook Server - 记录标识分配与预留过期对账
//!
//! # 架构概述
//!
//! - **标识分配** (`allocator`): 生成候选值并在存储中校验/预留唯一性，
//!   有界重试（次数 + 截止时间）
//! - **创建前钩子** (`hooks`): 为新用户填充 `user_id`，为新订单填充 `order_no`
//! - **过期对账** (`reconcile`): 定时取消超时未支付订单并退回库存
//! - **存储** (`db`): SQLite (sqlx) 与内存两种实现
//!
//! # 模块结构
//!
//! ```text
//! hook-server/src/
//! ├── core/          # 配置、状态、后台任务
//! ├── allocator/     # 标识方案、分配器、按日计数
//! ├── hooks/         # 创建前钩子
//! ├── reconcile/     # 对账器与调度器
//! ├── db/            # 存储 trait、SQLite 仓储、内存实现
//! └── utils/         # 日志、时间、错误
//! ```

pub mod allocator;
pub mod core;
pub mod db;
pub mod hooks;
pub mod reconcile;
pub mod utils;

// Re-export 公共类型
pub use allocator::{AllocError, IdentifierAllocator, Scheme, SequenceSource, UniquenessStrategy};
pub use core::{BackgroundTasks, Config, HookState};
pub use db::{DbService, MemoryStore};
pub use hooks::{BeforeCreate, CreatePayload, HookRegistry};
pub use reconcile::{ExpiryReconciler, ReconcileReport, TickOutcome};
pub use utils::{AppError, AppResult};

pub use utils::logger::{init_logger, init_logger_with_file};

/// 加载 `.env`、准备工作目录并初始化日志
pub fn setup_environment() -> AppResult<Config> {
    // .env 不存在不是错误
    dotenv::dotenv().ok();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;

    let log_dir = std::path::Path::new(&config.work_dir).join("logs");
    let log_dir = if config.is_production() {
        std::fs::create_dir_all(&log_dir)?;
        log_dir.to_str().map(str::to_string)
    } else {
        None
    };
    init_logger_with_file(
        Some(&config.log_level),
        Some(config.log_json),
        log_dir.as_deref(),
    );
    config.log_unrecognized();
    Ok(config)
}
