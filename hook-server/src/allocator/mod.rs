//! Identifier allocation
//!
//! Generate a candidate from a [`Scheme`], verify or reserve it against the
//! [`IdentifierStore`], retry on collision.
//!
//! # Strategies
//!
//! - [`UniquenessStrategy::ReserveIfAbsent`]: the candidate is accepted only if
//!   the store's conditional insert succeeds. Closes the check/insert race.
//! - [`UniquenessStrategy::CheckThenAccept`]: an existence query, then accept.
//!   For stores without a conditional insert. Two concurrent callers can both
//!   pass the check before either persists; the caller's insert is the only
//!   remaining guard.
//!
//! Sequential candidates from [`SequenceSource::AtomicCounter`] are distinct by
//! construction within one store; [`SequenceSource::CountQuery`] re-reads the
//! bucket count each attempt and steps forward by the attempt number.
//!
//! Every allocation is bounded by [`AllocationPolicy::max_attempts`] and
//! [`AllocationPolicy::deadline`].

pub mod scheme;
pub mod sequence;

pub use scheme::{Scheme, SequenceSource};
pub use sequence::SequenceCounter;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use shared::models::{Identifier, OwnerKind};
use thiserror::Error;
use tokio::time::Instant;

use crate::db::{IdentifierStore, RepoError, RepoResult};
use crate::utils::time::{BusinessDay, Clock};

#[derive(Debug, Error)]
pub enum AllocError {
    #[error("Store unavailable during {operation} after {attempts} attempt(s): {source}")]
    StoreUnavailable {
        operation: &'static str,
        attempts: u32,
        #[source]
        source: RepoError,
    },
    #[error("Allocation exhausted for {owner} after {attempts} candidate(s) in {elapsed_ms}ms")]
    Exhausted {
        owner: OwnerKind,
        attempts: u32,
        elapsed_ms: u64,
    },
}

pub type AllocResult<T> = Result<T, AllocError>;

/// How a candidate is made unique
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniquenessStrategy {
    CheckThenAccept,
    ReserveIfAbsent,
}

/// Bounds on one allocation
#[derive(Debug, Clone)]
pub struct AllocationPolicy {
    /// Candidates tried before giving up
    pub max_attempts: u32,
    /// Wall time before giving up
    pub deadline: Duration,
    /// Tries per store round-trip before `StoreUnavailable`
    pub store_attempts: u32,
    /// Backoff base between store tries (doubles each retry)
    pub store_retry_base: Duration,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 16,
            deadline: Duration::from_secs(2),
            store_attempts: 3,
            store_retry_base: Duration::from_millis(50),
        }
    }
}

/// Allocates store-unique identifiers for new records
#[derive(Clone)]
pub struct IdentifierAllocator {
    store: Arc<dyn IdentifierStore>,
    counter: SequenceCounter,
    clock: Arc<dyn Clock>,
    strategy: UniquenessStrategy,
    policy: AllocationPolicy,
}

impl IdentifierAllocator {
    pub fn new(
        store: Arc<dyn IdentifierStore>,
        clock: Arc<dyn Clock>,
        business_day: BusinessDay,
        strategy: UniquenessStrategy,
        policy: AllocationPolicy,
    ) -> Self {
        Self {
            counter: SequenceCounter::new(store.clone(), business_day),
            store,
            clock,
            strategy,
            policy,
        }
    }

    pub fn strategy(&self) -> UniquenessStrategy {
        self.strategy
    }

    /// Allocate an identifier for a new `owner` record.
    ///
    /// With `ReserveIfAbsent` the value is already recorded in the store when
    /// this returns; with `CheckThenAccept` the caller persists it.
    ///
    /// The deadline covers store round-trips and retry backoff, not only the
    /// gap between candidates.
    pub async fn allocate(&self, scheme: &Scheme, owner: OwnerKind) -> AllocResult<Identifier> {
        let started = Instant::now();
        let deadline_at = started + self.policy.deadline;
        let mut attempts = 0u32;

        while attempts < self.policy.max_attempts {
            if attempts > 0 && Instant::now() >= deadline_at {
                break;
            }

            let now = self.clock.now_millis();
            let Some(candidate) = self
                .candidate(scheme, owner, now, attempts, deadline_at)
                .await?
            else {
                break;
            };
            attempts += 1;

            let accepted = match self.strategy {
                UniquenessStrategy::CheckThenAccept => self
                    .with_store_retry("exists", deadline_at, || self.store.exists(owner, &candidate))
                    .await?
                    .map(|exists| !exists),
                UniquenessStrategy::ReserveIfAbsent => {
                    self.with_store_retry("claim", deadline_at, || {
                        self.store.claim(owner, &candidate, now)
                    })
                    .await?
                }
            };

            match accepted {
                Some(true) => {
                    tracing::debug!(
                        owner = %owner,
                        value = %candidate,
                        attempts,
                        "Identifier allocated"
                    );
                    return Ok(Identifier {
                        value: candidate,
                        scheme: scheme.kind(),
                        owner,
                    });
                }
                Some(false) => {
                    tracing::debug!(owner = %owner, value = %candidate, attempt = attempts, "Identifier collision, retrying");
                }
                None => break,
            }
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::warn!(owner = %owner, attempts, elapsed_ms, "Identifier allocation exhausted");
        Err(AllocError::Exhausted {
            owner,
            attempts,
            elapsed_ms,
        })
    }

    /// Next candidate; `None` when the deadline passed while talking to the store
    async fn candidate(
        &self,
        scheme: &Scheme,
        owner: OwnerKind,
        now: i64,
        attempt: u32,
        deadline_at: Instant,
    ) -> AllocResult<Option<String>> {
        match scheme {
            Scheme::Random { prefix } => Ok(Some(scheme::random_candidate(prefix, now))),
            Scheme::Sequential { prefix, source } => {
                let bucket = self.counter.bucket_at(now);
                let ordinal = match source {
                    SequenceSource::CountQuery => self
                        .with_store_retry("count", deadline_at, || {
                            self.counter.next_ordinal(owner, &bucket)
                        })
                        .await?
                        .map(|next| next + u64::from(attempt)),
                    SequenceSource::AtomicCounter => {
                        let key = bucket.key();
                        self.with_store_retry("next_in_bucket", deadline_at, || {
                            self.store.next_in_bucket(owner, &key)
                        })
                        .await?
                    }
                };
                let Some(ordinal) = ordinal else {
                    return Ok(None);
                };
                if ordinal > scheme::MAX_ORDINAL_IN_WIDTH {
                    tracing::warn!(
                        owner = %owner,
                        bucket = %bucket.key(),
                        ordinal,
                        "Sequence ordinal exceeds {} digits, identifier renders wider",
                        scheme::ORDINAL_WIDTH
                    );
                }
                Ok(Some(scheme::sequential_candidate(prefix, &bucket.key(), ordinal)))
            }
        }
    }

    /// Run one store round-trip, retrying transient errors with exponential backoff.
    ///
    /// `Ok(None)` when `deadline_at` passes during a call or would pass during
    /// the next backoff.
    async fn with_store_retry<T, F, Fut>(
        &self,
        operation: &'static str,
        deadline_at: Instant,
        mut op: F,
    ) -> AllocResult<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RepoResult<T>>,
    {
        let max = self.policy.store_attempts.max(1);
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let result = match tokio::time::timeout_at(deadline_at, op()).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(operation, attempt, "Store call hit the allocation deadline");
                    return Ok(None);
                }
            };
            match result {
                Ok(value) => return Ok(Some(value)),
                Err(e) if e.is_transient() && attempt < max => {
                    let delay = self.policy.store_retry_base * 2u32.saturating_pow(attempt - 1);
                    if Instant::now() + delay >= deadline_at {
                        tracing::warn!(
                            operation,
                            attempt,
                            error = %e,
                            "Store call failed, no time left before the allocation deadline"
                        );
                        return Ok(None);
                    }
                    tracing::warn!(
                        operation,
                        attempt,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "Store call failed, retrying..."
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!(operation, attempt, error = %e, "Store call failed");
                    return Err(AllocError::StoreUnavailable {
                        operation,
                        attempts: attempt,
                        source: e,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::utils::time::ManualClock;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn noon_2026_10_16() -> i64 {
        chrono::Utc
            .with_ymd_and_hms(2026, 10, 16, 12, 0, 0)
            .unwrap()
            .timestamp_millis()
    }

    fn fast_policy() -> AllocationPolicy {
        AllocationPolicy {
            max_attempts: 64,
            deadline: Duration::from_secs(5),
            store_attempts: 3,
            store_retry_base: Duration::from_millis(1),
        }
    }

    fn allocator(
        store: Arc<dyn IdentifierStore>,
        strategy: UniquenessStrategy,
        policy: AllocationPolicy,
    ) -> IdentifierAllocator {
        IdentifierAllocator::new(
            store,
            Arc::new(ManualClock::new(noon_2026_10_16())),
            BusinessDay::utc(),
            strategy,
            policy,
        )
    }

    /// Delegates to a memory store but always reports the same bucket count
    struct StaleCountStore {
        inner: MemoryStore,
        count: u64,
    }

    #[async_trait]
    impl IdentifierStore for StaleCountStore {
        async fn exists(&self, owner: OwnerKind, value: &str) -> RepoResult<bool> {
            self.inner.exists(owner, value).await
        }
        async fn claim(&self, owner: OwnerKind, value: &str, at: i64) -> RepoResult<bool> {
            self.inner.claim(owner, value, at).await
        }
        async fn register(&self, owner: OwnerKind, value: &str, at: i64) -> RepoResult<()> {
            self.inner.register(owner, value, at).await
        }
        async fn count_between(&self, _: OwnerKind, _: i64, _: i64) -> RepoResult<u64> {
            Ok(self.count)
        }
        async fn next_in_bucket(&self, owner: OwnerKind, bucket: &str) -> RepoResult<u64> {
            self.inner.next_in_bucket(owner, bucket).await
        }
        async fn release(&self, owner: OwnerKind, value: &str) -> RepoResult<bool> {
            self.inner.release(owner, value).await
        }
    }

    /// Every value exists; fails the first `failures` calls
    struct HostileStore {
        failures: AtomicU32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl IdentifierStore for HostileStore {
        async fn exists(&self, _: OwnerKind, _: &str) -> RepoResult<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(RepoError::Database("connection reset".into()));
            }
            Ok(true)
        }
        async fn claim(&self, _: OwnerKind, _: &str, _: i64) -> RepoResult<bool> {
            Ok(false)
        }
        async fn register(&self, _: OwnerKind, _: &str, _: i64) -> RepoResult<()> {
            Ok(())
        }
        async fn count_between(&self, _: OwnerKind, _: i64, _: i64) -> RepoResult<u64> {
            Ok(0)
        }
        async fn next_in_bucket(&self, _: OwnerKind, _: &str) -> RepoResult<u64> {
            Ok(1)
        }
        async fn release(&self, _: OwnerKind, _: &str) -> RepoResult<bool> {
            Ok(false)
        }
    }

    /// Takes a while to answer, then fails with a transient error
    struct SlowStore {
        delay: Duration,
    }

    #[async_trait]
    impl IdentifierStore for SlowStore {
        async fn exists(&self, _: OwnerKind, _: &str) -> RepoResult<bool> {
            tokio::time::sleep(self.delay).await;
            Err(RepoError::Database("busy".into()))
        }
        async fn claim(&self, _: OwnerKind, _: &str, _: i64) -> RepoResult<bool> {
            tokio::time::sleep(self.delay).await;
            Err(RepoError::Database("busy".into()))
        }
        async fn register(&self, _: OwnerKind, _: &str, _: i64) -> RepoResult<()> {
            Ok(())
        }
        async fn count_between(&self, _: OwnerKind, _: i64, _: i64) -> RepoResult<u64> {
            Ok(0)
        }
        async fn next_in_bucket(&self, _: OwnerKind, _: &str) -> RepoResult<u64> {
            tokio::time::sleep(self.delay).await;
            Err(RepoError::Database("busy".into()))
        }
        async fn release(&self, _: OwnerKind, _: &str) -> RepoResult<bool> {
            Ok(false)
        }
    }

    /// Registers the first value it is asked about, so the first candidate collides
    struct FirstTakenStore {
        inner: MemoryStore,
        taken: parking_lot::Mutex<Option<String>>,
    }

    #[async_trait]
    impl IdentifierStore for FirstTakenStore {
        async fn exists(&self, owner: OwnerKind, value: &str) -> RepoResult<bool> {
            let first = {
                let mut taken = self.taken.lock();
                if taken.is_none() {
                    *taken = Some(value.to_string());
                    true
                } else {
                    false
                }
            };
            if first {
                self.inner.register(owner, value, 0).await?;
            }
            self.inner.exists(owner, value).await
        }
        async fn claim(&self, owner: OwnerKind, value: &str, at: i64) -> RepoResult<bool> {
            self.inner.claim(owner, value, at).await
        }
        async fn register(&self, owner: OwnerKind, value: &str, at: i64) -> RepoResult<()> {
            self.inner.register(owner, value, at).await
        }
        async fn count_between(&self, owner: OwnerKind, start: i64, end: i64) -> RepoResult<u64> {
            self.inner.count_between(owner, start, end).await
        }
        async fn next_in_bucket(&self, owner: OwnerKind, bucket: &str) -> RepoResult<u64> {
            self.inner.next_in_bucket(owner, bucket).await
        }
        async fn release(&self, owner: OwnerKind, value: &str) -> RepoResult<bool> {
            self.inner.release(owner, value).await
        }
    }

    #[tokio::test]
    async fn test_random_collision_yields_different_value() {
        let store = Arc::new(FirstTakenStore {
            inner: MemoryStore::new(),
            taken: parking_lot::Mutex::new(None),
        });
        let alloc = allocator(store.clone(), UniquenessStrategy::CheckThenAccept, fast_policy());

        let id = alloc
            .allocate(&Scheme::random("FT"), OwnerKind::User)
            .await
            .unwrap();

        let taken = store.taken.lock().clone().unwrap();
        assert_ne!(id.value, taken);
        assert!(scheme::is_random_shaped("FT", &id.value), "{}", id.value);
        // Only the colliding candidate is held
        assert_eq!(store.inner.identifiers(OwnerKind::User), vec![taken]);
    }

    #[tokio::test]
    async fn test_slow_store_is_bounded_by_deadline() {
        let store = Arc::new(SlowStore {
            delay: Duration::from_millis(300),
        });
        let policy = AllocationPolicy {
            max_attempts: 16,
            deadline: Duration::from_millis(100),
            store_attempts: 3,
            store_retry_base: Duration::from_millis(50),
        };

        for (strategy, scheme) in [
            (UniquenessStrategy::ReserveIfAbsent, Scheme::random("FT")),
            (UniquenessStrategy::CheckThenAccept, Scheme::random("FT")),
            (
                UniquenessStrategy::ReserveIfAbsent,
                Scheme::sequential("ORD", SequenceSource::AtomicCounter),
            ),
        ] {
            let alloc = allocator(store.clone(), strategy, policy.clone());
            let started = std::time::Instant::now();
            let err = alloc.allocate(&scheme, OwnerKind::Order).await.unwrap_err();
            let elapsed = started.elapsed();

            assert!(matches!(err, AllocError::Exhausted { .. }), "{err}");
            assert!(elapsed < Duration::from_millis(250), "took {elapsed:?}");
        }
    }

    #[tokio::test]
    async fn test_backoff_past_deadline_is_not_slept() {
        let store = Arc::new(HostileStore {
            failures: AtomicU32::new(10),
            calls: AtomicU32::new(0),
        });
        let policy = AllocationPolicy {
            max_attempts: 16,
            deadline: Duration::from_millis(100),
            store_attempts: 3,
            store_retry_base: Duration::from_secs(10),
        };
        let alloc = allocator(store.clone(), UniquenessStrategy::CheckThenAccept, policy);

        let started = std::time::Instant::now();
        let err = alloc
            .allocate(&Scheme::random("FT"), OwnerKind::User)
            .await
            .unwrap_err();
        assert!(matches!(err, AllocError::Exhausted { attempts: 1, .. }), "{err}");
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_random_scheme_shape_and_uniqueness() {
        let store = Arc::new(MemoryStore::new());
        let alloc = allocator(store.clone(), UniquenessStrategy::ReserveIfAbsent, fast_policy());
        let scheme = Scheme::random("FT");

        let mut seen = HashSet::new();
        for _ in 0..50 {
            let id = alloc.allocate(&scheme, OwnerKind::User).await.unwrap();
            assert!(scheme::is_random_shaped("FT", &id.value), "{}", id.value);
            assert!(id.value.starts_with("FTMVAX"), "{}", id.value);
            assert_eq!(id.scheme, shared::models::IdScheme::Random);
            assert!(seen.insert(id.value));
        }
        assert_eq!(store.identifiers(OwnerKind::User).len(), 50);
    }

    #[tokio::test]
    async fn test_check_then_accept_never_returns_existing_value() {
        let store = Arc::new(MemoryStore::new());
        let at = noon_2026_10_16();
        store.register(OwnerKind::Order, "ORD20261016001", at).await.unwrap();
        let alloc = allocator(store.clone(), UniquenessStrategy::CheckThenAccept, fast_policy());
        let scheme = Scheme::sequential("ORD", SequenceSource::CountQuery);

        let id = alloc.allocate(&scheme, OwnerKind::Order).await.unwrap();
        assert_eq!(id.value, "ORD20261016002");
        // Check-then-accept leaves persistence to the caller
        assert!(!store.exists(OwnerKind::Order, &id.value).await.unwrap());
    }

    #[tokio::test]
    async fn test_sequential_count_query_is_monotonic() {
        let store = Arc::new(MemoryStore::new());
        let alloc = allocator(store.clone(), UniquenessStrategy::ReserveIfAbsent, fast_policy());
        let scheme = Scheme::sequential("ORD", SequenceSource::CountQuery);

        let mut values = Vec::new();
        for _ in 0..5 {
            values.push(alloc.allocate(&scheme, OwnerKind::Order).await.unwrap().value);
        }
        assert_eq!(
            values,
            vec![
                "ORD20261016001",
                "ORD20261016002",
                "ORD20261016003",
                "ORD20261016004",
                "ORD20261016005"
            ]
        );
    }

    #[tokio::test]
    async fn test_sequential_atomic_counter() {
        let store = Arc::new(MemoryStore::new());
        let alloc = allocator(store.clone(), UniquenessStrategy::ReserveIfAbsent, fast_policy());
        let scheme = Scheme::sequential("ORD", SequenceSource::AtomicCounter);

        let a = alloc.allocate(&scheme, OwnerKind::Order).await.unwrap();
        let b = alloc.allocate(&scheme, OwnerKind::Order).await.unwrap();
        assert_eq!(a.value, "ORD20261016001");
        assert_eq!(b.value, "ORD20261016002");
    }

    #[tokio::test]
    async fn test_atomic_counter_skips_preexisting_values() {
        let store = Arc::new(MemoryStore::new());
        store
            .register(OwnerKind::Order, "ORD20261016001", noon_2026_10_16())
            .await
            .unwrap();
        let alloc = allocator(store.clone(), UniquenessStrategy::ReserveIfAbsent, fast_policy());
        let scheme = Scheme::sequential("ORD", SequenceSource::AtomicCounter);

        let id = alloc.allocate(&scheme, OwnerKind::Order).await.unwrap();
        assert_eq!(id.value, "ORD20261016002");
    }

    #[tokio::test]
    async fn test_stale_count_converges_under_concurrency() {
        let store = Arc::new(StaleCountStore {
            inner: MemoryStore::new(),
            count: 0,
        });
        let alloc = allocator(store.clone(), UniquenessStrategy::ReserveIfAbsent, fast_policy());
        let scheme = Scheme::sequential("ORD", SequenceSource::CountQuery);

        let mut handles = Vec::new();
        for _ in 0..20 {
            let alloc = alloc.clone();
            let scheme = scheme.clone();
            handles.push(tokio::spawn(async move {
                alloc.allocate(&scheme, OwnerKind::Order).await
            }));
        }

        let mut values = HashSet::new();
        for handle in handles {
            let id = handle.await.unwrap().unwrap();
            assert!(values.insert(id.value), "duplicate identifier returned");
        }
        assert_eq!(values.len(), 20);
        for n in 1..=20 {
            assert!(values.contains(&format!("ORD20261016{:03}", n)));
        }
    }

    #[tokio::test]
    async fn test_exhausted_after_max_attempts() {
        let store = Arc::new(HostileStore {
            failures: AtomicU32::new(0),
            calls: AtomicU32::new(0),
        });
        let policy = AllocationPolicy {
            max_attempts: 5,
            ..fast_policy()
        };
        let alloc = allocator(store.clone(), UniquenessStrategy::CheckThenAccept, policy);

        let err = alloc
            .allocate(&Scheme::random("FT"), OwnerKind::User)
            .await
            .unwrap_err();
        assert!(matches!(err, AllocError::Exhausted { attempts: 5, .. }), "{err}");
        assert_eq!(store.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_exhausted_at_deadline() {
        let store = Arc::new(HostileStore {
            failures: AtomicU32::new(0),
            calls: AtomicU32::new(0),
        });
        let policy = AllocationPolicy {
            max_attempts: 1_000,
            deadline: Duration::ZERO,
            ..fast_policy()
        };
        let alloc = allocator(store, UniquenessStrategy::CheckThenAccept, policy);

        let err = alloc
            .allocate(&Scheme::random("FT"), OwnerKind::User)
            .await
            .unwrap_err();
        assert!(matches!(err, AllocError::Exhausted { attempts: 1, .. }), "{err}");
    }

    #[tokio::test]
    async fn test_transient_store_errors_are_retried() {
        let store = Arc::new(HostileStore {
            failures: AtomicU32::new(2),
            calls: AtomicU32::new(0),
        });
        let policy = AllocationPolicy {
            max_attempts: 1,
            ..fast_policy()
        };
        let alloc = allocator(store.clone(), UniquenessStrategy::CheckThenAccept, policy);

        // Two failures absorbed by retry, third call answers "exists"
        let err = alloc
            .allocate(&Scheme::random("FT"), OwnerKind::User)
            .await
            .unwrap_err();
        assert!(matches!(err, AllocError::Exhausted { .. }), "{err}");
        assert_eq!(store.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_store_unavailable_after_retries() {
        let store = Arc::new(MemoryStore::new());
        store.set_unavailable(true);
        let alloc = allocator(store, UniquenessStrategy::ReserveIfAbsent, fast_policy());

        let err = alloc
            .allocate(&Scheme::random("FT"), OwnerKind::User)
            .await
            .unwrap_err();
        match err {
            AllocError::StoreUnavailable {
                operation,
                attempts,
                ..
            } => {
                assert_eq!(operation, "claim");
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_ordinal_overflow_renders_wider() {
        let store = Arc::new(StaleCountStore {
            inner: MemoryStore::new(),
            count: 999,
        });
        let alloc = allocator(store, UniquenessStrategy::ReserveIfAbsent, fast_policy());
        let id = alloc
            .allocate(&Scheme::sequential("ORD", SequenceSource::CountQuery), OwnerKind::Order)
            .await
            .unwrap();
        assert_eq!(id.value, "ORD202610161000");
    }
}
