use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Clone, Debug)]
struct CacheEntry<T> {
    value: T,
    expiry: Instant,
}

/// String-keyed store with one TTL shared by every entry.
///
/// Expired entries are invisible to `get` as soon as their deadline passes and
/// are physically removed either by that `get` or by the periodic sweep.
/// There is no capacity bound: a `set` is always readable until it expires.
#[derive(Clone)]
pub struct ExpiringCache<T: Clone + Send + Sync + 'static> {
    inner: Cache<String, CacheEntry<T>>,
    ttl: Duration,
}

impl<T: Clone + Send + Sync + 'static> ExpiringCache<T> {
    pub fn new(ttl: Duration) -> Self {
        let inner = Cache::builder().time_to_live(ttl).build();

        Self { inner, ttl }
    }

    pub async fn set(&self, key: impl Into<String>, value: T) {
        let entry = CacheEntry {
            value,
            expiry: Instant::now() + self.ttl,
        };
        self.inner.insert(key.into(), entry).await;
    }

    pub async fn get(&self, key: &str) -> Option<T> {
        let now = Instant::now();
        let entry = self.inner.get(key).await?;
        if now <= entry.expiry {
            return Some(entry.value);
        }

        match self.remove_if_expired(key, now).await {
            // Replaced by a concurrent `set` after our read.
            CompResult::Unchanged(current) => Some(current.into_value().value),
            _ => None,
        }
    }

    /// Removes `key` only if the entry stored right now is past its deadline,
    /// so a value written after the caller's read is never dropped.
    async fn remove_if_expired(&self, key: &str, now: Instant) -> CompResult<String, CacheEntry<T>> {
        self.inner
            .entry_by_ref(key)
            .and_compute_with(|current| async move {
                match current {
                    Some(entry) if now > entry.value().expiry => Op::Remove,
                    _ => Op::Nop,
                }
            })
            .await
    }

    pub async fn delete(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    pub async fn clear(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks().await;
    }

    /// Removes every entry whose deadline has passed. Returns how many were dropped.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<String> = self
            .inner
            .iter()
            .filter(|(_, entry)| now > entry.expiry)
            .map(|(key, _)| key.as_ref().clone())
            .collect();

        let mut removed = 0;
        for key in &expired {
            if let CompResult::Removed(_) = self.remove_if_expired(key, now).await {
                removed += 1;
            }
        }
        self.inner.run_pending_tasks().await;

        removed
    }

    pub async fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }

    /// Runs `sweep` every `period` until `shutdown` is cancelled.
    pub fn spawn_sweeper(&self, period: Duration, shutdown: CancellationToken) -> JoinHandle<()> {
        let cache = self.clone();

        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        tracing::debug!("Cache sweeper stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let removed = cache.sweep().await;
                        if removed > 0 {
                            tracing::debug!("Cache sweep removed {} expired entries", removed);
                        }
                    }
                }
            }
        })
    }
}
