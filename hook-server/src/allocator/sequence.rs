//! Per-day sequence counting

use std::sync::Arc;

use shared::models::OwnerKind;

use crate::db::{IdentifierStore, RepoResult};
use crate::utils::time::{BusinessDay, DayBucket};

/// Counts records per day bucket in the configured business timezone
#[derive(Clone)]
pub struct SequenceCounter {
    store: Arc<dyn IdentifierStore>,
    business_day: BusinessDay,
}

impl SequenceCounter {
    pub fn new(store: Arc<dyn IdentifierStore>, business_day: BusinessDay) -> Self {
        Self {
            store,
            business_day,
        }
    }

    /// Bucket containing `now_millis`
    pub fn bucket_at(&self, now_millis: i64) -> DayBucket {
        self.business_day.bucket_at(now_millis)
    }

    /// Records of `owner` created within `[bucket_start, bucket_end]`
    pub async fn count_in_bucket(
        &self,
        owner: OwnerKind,
        bucket_start: i64,
        bucket_end: i64,
    ) -> RepoResult<u64> {
        self.store.count_between(owner, bucket_start, bucket_end).await
    }

    /// `1 + count` for the bucket; not a reservation, callers must still verify
    pub async fn next_ordinal(&self, owner: OwnerKind, bucket: &DayBucket) -> RepoResult<u64> {
        let count = self
            .count_in_bucket(owner, bucket.start_ms, bucket.end_ms)
            .await?;
        Ok(count + 1)
    }
}
