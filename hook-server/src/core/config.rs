use std::time::Duration;

use crate::allocator::{AllocationPolicy, SequenceSource, UniquenessStrategy};
use crate::utils::time::{self, BusinessDay};

/// 服务配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录（数据库、日志） |
/// | DATABASE_PATH | {WORK_DIR}/hooks.db | SQLite 数据库文件 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 格式日志 |
/// | BUSINESS_TIMEZONE | UTC | 营业日分桶时区 (IANA) |
/// | USER_ID_PREFIX | FT | 用户标识前缀 |
/// | ORDER_NO_PREFIX | ORD | 订单号前缀 |
/// | ALLOC_STRATEGY | reserve | `reserve` 条件插入 / `check` 先查后用 |
/// | ORDER_SEQUENCE_SOURCE | counter | `counter` 原子计数器 / `count` 计数查询 |
/// | ALLOC_MAX_ATTEMPTS | 16 | 候选值最大尝试次数 |
/// | ALLOC_DEADLINE_MS | 2000 | 分配截止时间(毫秒) |
/// | STORE_RETRY_ATTEMPTS | 3 | 存储调用重试次数 |
/// | STORE_RETRY_BASE_MS | 50 | 重试退避基数(毫秒) |
/// | RECONCILE_INTERVAL_SECS | 300 | 对账周期(秒) |
/// | RESERVATION_TIMEOUT_SECS | 1800 | 预留超时(秒) |
///
/// # 示例
///
/// ```ignore
/// BUSINESS_TIMEZONE=Europe/Madrid RESERVATION_TIMEOUT_SECS=900 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    pub database_path: String,
    /// 运行环境: development | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    /// IANA 时区名，解析失败时回退 UTC
    pub business_timezone: String,
    pub user_id_prefix: String,
    pub order_no_prefix: String,
    pub strategy: UniquenessStrategy,
    pub order_sequence_source: SequenceSource,
    pub alloc_max_attempts: u32,
    pub alloc_deadline_ms: u64,
    pub store_retry_attempts: u32,
    pub store_retry_base_ms: u64,
    pub reconcile_interval_secs: u64,
    pub reservation_timeout_secs: u64,
    /// 加载时无法识别的 (变量, 原值)
    pub unrecognized: Vec<(&'static str, String)>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载配置
    ///
    /// 无法识别的值回退到默认值并记入 `unrecognized`，此时日志尚未初始化，
    /// 由 [`Config::log_unrecognized`] 在之后输出。
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut unrecognized = Vec::new();
        let work_dir = get("WORK_DIR").unwrap_or_else(|| "./data".into());
        let database_path = get("DATABASE_PATH").unwrap_or_else(|| format!("{}/hooks.db", work_dir));

        let mut number = |key: &'static str, default: u64| -> u64 {
            match get(key) {
                None => default,
                Some(raw) => match raw.trim().parse() {
                    Ok(v) => v,
                    Err(_) => {
                        unrecognized.push((key, raw));
                        default
                    }
                },
            }
        };
        let alloc_max_attempts = number("ALLOC_MAX_ATTEMPTS", 16);
        let alloc_deadline_ms = number("ALLOC_DEADLINE_MS", 2000);
        let store_retry_attempts = number("STORE_RETRY_ATTEMPTS", 3);
        let store_retry_base_ms = number("STORE_RETRY_BASE_MS", 50);
        let reconcile_interval_secs = number("RECONCILE_INTERVAL_SECS", 300);
        let reservation_timeout_secs = number("RESERVATION_TIMEOUT_SECS", 1800);

        let strategy = match get("ALLOC_STRATEGY") {
            None => UniquenessStrategy::ReserveIfAbsent,
            Some(raw) => parse_strategy(&raw).unwrap_or_else(|| {
                unrecognized.push(("ALLOC_STRATEGY", raw));
                UniquenessStrategy::ReserveIfAbsent
            }),
        };
        let order_sequence_source = match get("ORDER_SEQUENCE_SOURCE") {
            None => SequenceSource::AtomicCounter,
            Some(raw) => parse_sequence_source(&raw).unwrap_or_else(|| {
                unrecognized.push(("ORDER_SEQUENCE_SOURCE", raw));
                SequenceSource::AtomicCounter
            }),
        };
        let log_json = match get("LOG_JSON") {
            None => false,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                unrecognized.push(("LOG_JSON", raw));
                false
            }),
        };

        Self {
            database_path,
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".into()),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json,
            business_timezone: get("BUSINESS_TIMEZONE").unwrap_or_else(|| "UTC".into()),
            user_id_prefix: get("USER_ID_PREFIX").unwrap_or_else(|| "FT".into()),
            order_no_prefix: get("ORDER_NO_PREFIX").unwrap_or_else(|| "ORD".into()),
            strategy,
            order_sequence_source,
            alloc_max_attempts: u32::try_from(alloc_max_attempts).unwrap_or(u32::MAX),
            alloc_deadline_ms,
            store_retry_attempts: u32::try_from(store_retry_attempts).unwrap_or(u32::MAX),
            store_retry_base_ms,
            reconcile_interval_secs,
            reservation_timeout_secs,
            work_dir,
            unrecognized,
        }
    }

    /// 输出加载时回退到默认值的配置项（须在日志初始化之后调用）
    pub fn log_unrecognized(&self) {
        for (key, value) in &self.unrecognized {
            tracing::warn!("Unrecognized {} '{}', using the default", key, value);
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn allocation_policy(&self) -> AllocationPolicy {
        AllocationPolicy {
            max_attempts: self.alloc_max_attempts.max(1),
            deadline: Duration::from_millis(self.alloc_deadline_ms),
            store_attempts: self.store_retry_attempts.max(1),
            store_retry_base: Duration::from_millis(self.store_retry_base_ms),
        }
    }

    pub fn business_day(&self) -> BusinessDay {
        BusinessDay::new(time::parse_timezone(&self.business_timezone))
    }

    pub fn reconcile_interval(&self) -> Duration {
        // tokio interval panics on a zero period
        Duration::from_secs(self.reconcile_interval_secs.max(1))
    }

    pub fn reservation_timeout(&self) -> Duration {
        Duration::from_secs(self.reservation_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_strategy(value: &str) -> Option<UniquenessStrategy> {
    match value.trim() {
        "" | "reserve" => Some(UniquenessStrategy::ReserveIfAbsent),
        "check" => Some(UniquenessStrategy::CheckThenAccept),
        _ => None,
    }
}

fn parse_sequence_source(value: &str) -> Option<SequenceSource> {
    match value.trim() {
        "" | "counter" => Some(SequenceSource::AtomicCounter),
        "count" => Some(SequenceSource::CountQuery),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!(parse_strategy("reserve"), Some(UniquenessStrategy::ReserveIfAbsent));
        assert_eq!(parse_strategy("check"), Some(UniquenessStrategy::CheckThenAccept));
        assert_eq!(parse_strategy("bogus"), None);
    }

    #[test]
    fn test_parse_sequence_source() {
        assert_eq!(parse_sequence_source(""), Some(SequenceSource::AtomicCounter));
        assert_eq!(parse_sequence_source(" count "), Some(SequenceSource::CountQuery));
        assert_eq!(parse_sequence_source("x"), None);
    }

    #[test]
    fn test_defaults_from_empty_lookup() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.database_path, "./data/hooks.db");
        assert_eq!(config.strategy, UniquenessStrategy::ReserveIfAbsent);
        assert_eq!(config.order_sequence_source, SequenceSource::AtomicCounter);
        assert_eq!(config.reservation_timeout(), Duration::from_secs(1800));
        assert!(config.unrecognized.is_empty());
    }

    #[test]
    fn test_unrecognized_values_fall_back_and_are_kept() {
        let config = Config::from_lookup(lookup(&[
            ("ALLOC_STRATEGY", "optimistic"),
            ("ORDER_SEQUENCE_SOURCE", "count"),
            ("ALLOC_DEADLINE_MS", "soon"),
            ("RESERVATION_TIMEOUT_SECS", "900"),
        ]));
        assert_eq!(config.strategy, UniquenessStrategy::ReserveIfAbsent);
        assert_eq!(config.order_sequence_source, SequenceSource::CountQuery);
        assert_eq!(config.alloc_deadline_ms, 2000);
        assert_eq!(config.reservation_timeout_secs, 900);
        assert_eq!(
            config.unrecognized,
            vec![
                ("ALLOC_DEADLINE_MS", "soon".to_string()),
                ("ALLOC_STRATEGY", "optimistic".to_string()),
            ]
        );
    }

    #[test]
    fn test_policy_clamps_zero_attempts() {
        let mut config = Config::from_env();
        config.alloc_max_attempts = 0;
        config.store_retry_attempts = 0;
        config.reconcile_interval_secs = 0;
        let policy = config.allocation_policy();
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.store_attempts, 1);
        assert_eq!(config.reconcile_interval(), Duration::from_secs(1));
    }
}
