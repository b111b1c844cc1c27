//! 时间工具函数：时钟注入与营业日分桶
//!
//! 所有时间戳均为 Unix millis。分桶使用配置的业务时区，而不是系统本地时区。

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{NaiveDate, TimeZone};
use chrono_tz::Tz;

/// Wall clock source, injected wherever "now" matters
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Real time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        shared::util::now_millis()
    }
}

/// Manually driven clock for deterministic tests and replays
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(now_millis),
        }
    }

    pub fn set(&self, now_millis: i64) {
        self.now.store(now_millis, Ordering::SeqCst);
    }

    pub fn advance_millis(&self, delta: i64) {
        self.now.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// One calendar day in the business timezone
///
/// `start_ms` is 00:00:00.000 and `end_ms` is 23:59:59.999, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub start_ms: i64,
    pub end_ms: i64,
}

impl DayBucket {
    /// `YYYYMMDD`
    pub fn key(&self) -> String {
        self.date.format("%Y%m%d").to_string()
    }

    pub fn contains(&self, millis: i64) -> bool {
        millis >= self.start_ms && millis <= self.end_ms
    }
}

/// Day bucketing policy bound to a fixed timezone
#[derive(Debug, Clone, Copy)]
pub struct BusinessDay {
    tz: Tz,
}

impl BusinessDay {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn utc() -> Self {
        Self { tz: chrono_tz::UTC }
    }

    /// Bucket containing `millis`
    pub fn bucket_at(&self, millis: i64) -> DayBucket {
        let date = match chrono::DateTime::from_timestamp_millis(millis) {
            Some(dt) => dt.with_timezone(&self.tz).date_naive(),
            None => {
                tracing::warn!(millis, "Timestamp out of range, bucketing at epoch");
                chrono::DateTime::UNIX_EPOCH.date_naive()
            }
        };
        self.bucket_for(date)
    }

    /// Bucket for a calendar date
    pub fn bucket_for(&self, date: NaiveDate) -> DayBucket {
        let start_ms = day_start_millis(date, self.tz);
        let next = date.succ_opt().unwrap_or(date);
        let end_ms = day_start_millis(next, self.tz) - 1;
        DayBucket {
            date,
            start_ms,
            end_ms,
        }
    }
}

/// 日期开始 (00:00:00) → Unix millis (业务时区)
///
/// DST gap fallback: 如果本地时间不存在 (夏令时跳跃)，fallback 到 UTC。
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 解析 IANA 时区名称，失败返回 UTC
pub fn parse_timezone(name: &str) -> Tz {
    name.parse::<Tz>().unwrap_or_else(|e| {
        tracing::warn!(
            "Failed to parse business timezone '{}': {}, falling back to UTC",
            name,
            e
        );
        chrono_tz::UTC
    })
}
