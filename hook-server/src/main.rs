use std::time::Duration;

use hook_server::{BackgroundTasks, HookState, setup_environment};

const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(60);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 工作目录, 日志) 并加载配置
    let config = setup_environment()?;

    tracing::info!(
        environment = %config.environment,
        timezone = %config.business_timezone,
        strategy = ?config.strategy,
        "Hook server starting..."
    );

    // 2. 初始化状态 (数据库、分配器、钩子、对账器)
    let (state, _db) = HookState::initialize(&config).await?;

    // 3. 启动后台任务
    let mut tasks = BackgroundTasks::new();
    state.start_background_tasks(&mut tasks);

    // 4. 等待 Ctrl-C，期间定期检查任务健康
    let mut health = tokio::time::interval(HEALTH_CHECK_INTERVAL);
    health.tick().await;
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "Failed to listen for Ctrl-C, shutting down");
                }
                break;
            }
            _ = health.tick() => {
                tasks.check_health();
            }
        }
    }

    // 5. Graceful shutdown
    tasks.shutdown(SHUTDOWN_GRACE).await;
    tracing::info!("Hook server stopped");
    Ok(())
}
