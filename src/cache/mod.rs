/// In-memory expiring cache for remote configuration files
///
/// Each entry expires after the lifetime its own value declares. A lookup
/// on a missing or expired key refreshes it synchronously through the
/// loader the cache was built with. Refreshes of one key are serialized so
/// concurrent callers share a single fetch; other keys are not blocked.

pub mod config_cache;

pub use config_cache::CachedConfigSource;

use crate::{
    error::{ResolverError, ResolverResult},
    metrics,
};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::debug;

/// A value that knows how long it may be cached after being fetched
pub trait Cacheable {
    fn cache_lifetime(&self) -> Result<Duration, String>;
}

/// Fetches the value for a key on a miss
pub type Loader<V> = Arc<dyn Fn(String) -> BoxFuture<'static, ResolverResult<V>> + Send + Sync>;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Per-key update lock, dropped from the slot map once no caller holds it
#[derive(Default)]
struct KeySlot {
    lock: Mutex<()>,
    /// Completed refreshes of this key
    refreshes: AtomicU64,
    /// Failed refreshes of this key
    failures: AtomicU64,
    last_failure: Mutex<Option<Arc<ResolverError>>>,
}

enum Lookup<V> {
    Live(V),
    Expired,
    Absent,
}

/// Pull-through cache with per-entry expiry
pub struct ExpiringCache<V> {
    category: &'static str,
    loader: Loader<V>,
    entries: RwLock<HashMap<String, Entry<V>>>,
    slots: Mutex<HashMap<String, Arc<KeySlot>>>,
}

impl<V> ExpiringCache<V>
where
    V: Cacheable + Clone + Send + Sync + 'static,
{
    /// Create a cache named `category` (used in errors, logs and metrics)
    pub fn new<F, Fut>(category: &'static str, loader: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ResolverResult<V>> + Send + 'static,
    {
        let loader: Loader<V> = Arc::new(move |key| Box::pin(loader(key)));

        Self {
            category,
            loader,
            entries: RwLock::new(HashMap::new()),
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn category(&self) -> &'static str {
        self.category
    }

    /// Get the value for `key`, fetching it if missing or expired
    pub async fn get(&self, key: &str) -> ResolverResult<V> {
        if let Lookup::Live(value) = self.lookup(key).await {
            debug!("Cache HIT: {} {}", self.category, key);
            metrics::record_cache_access(self.category, true);
            return Ok(value);
        }

        let slot = self.slot(key).await;
        let result = self.refresh(key, &slot).await;
        self.release(key, slot).await;

        result
    }

    /// Refresh `key` under its update lock
    async fn refresh(&self, key: &str, slot: &KeySlot) -> ResolverResult<V> {
        let refreshes_seen = slot.refreshes.load(Ordering::Acquire);
        let failures_seen = slot.failures.load(Ordering::Acquire);
        let _guard = slot.lock.lock().await;

        // Another caller may have refreshed the key while we waited
        match self.lookup(key).await {
            Lookup::Live(value) => {
                debug!("Cache HIT after wait: {} {}", self.category, key);
                metrics::record_cache_access(self.category, true);
                return Ok(value);
            }
            Lookup::Absent if slot.refreshes.load(Ordering::Acquire) != refreshes_seen => {
                return Err(ResolverError::CacheRefreshInconsistency {
                    category: self.category,
                    key: key.to_string(),
                });
            }
            Lookup::Absent | Lookup::Expired => {}
        }

        // The refresh we waited on failed; share its cause instead of fetching again
        if slot.failures.load(Ordering::Acquire) != failures_seen {
            if let Some(source) = slot.last_failure.lock().await.clone() {
                debug!("Cache refresh failed while waiting: {} {}", self.category, key);
                return Err(ResolverError::CacheFetchFailure {
                    category: self.category,
                    key: key.to_string(),
                    source,
                });
            }
        }

        debug!("Cache MISS: {} {}", self.category, key);
        metrics::record_cache_access(self.category, false);

        let value = match (self.loader)(key.to_string()).await {
            Ok(value) => value,
            Err(e) => {
                let source = Arc::new(e);
                *slot.last_failure.lock().await = Some(source.clone());
                slot.failures.fetch_add(1, Ordering::Release);

                return Err(ResolverError::CacheFetchFailure {
                    category: self.category,
                    key: key.to_string(),
                    source,
                });
            }
        };

        let lifetime = self.lifetime_of(key, &value)?;
        let expires_at = Instant::now() + lifetime;

        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                value: value.clone(),
                expires_at,
            },
        );
        slot.refreshes.fetch_add(1, Ordering::Release);

        debug!(
            "Cache SET: {} {} (TTL: {}s)",
            self.category,
            key,
            lifetime.as_secs()
        );

        Ok(value)
    }

    /// Number of stored entries, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn lookup(&self, key: &str) -> Lookup<V> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => Lookup::Live(entry.value.clone()),
            Some(_) => Lookup::Expired,
            None => Lookup::Absent,
        }
    }

    async fn slot(&self, key: &str) -> Arc<KeySlot> {
        let mut slots = self.slots.lock().await;
        slots.entry(key.to_string()).or_default().clone()
    }

    /// Give back a slot taken by `slot`, removing it when the map holds the
    /// only other reference
    async fn release(&self, key: &str, slot: Arc<KeySlot>) {
        let mut slots = self.slots.lock().await;
        if Arc::strong_count(&slot) == 2 {
            slots.remove(key);
        }
        drop(slot);
    }

    /// Number of keys with a refresh in progress or pending
    pub async fn pending_refreshes(&self) -> usize {
        self.slots.lock().await.len()
    }

    fn lifetime_of(&self, key: &str, value: &V) -> ResolverResult<Duration> {
        let invalid = |reason: String| ResolverError::InvalidLifetime {
            category: self.category,
            key: key.to_string(),
            reason,
        };

        let lifetime = value.cache_lifetime().map_err(invalid)?;
        if lifetime.is_zero() {
            return Err(invalid("lifetime is zero".to_string()));
        }

        Ok(lifetime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug, Clone, PartialEq)]
    struct Versioned {
        version: usize,
        ttl: Duration,
    }

    impl Cacheable for Versioned {
        fn cache_lifetime(&self) -> Result<Duration, String> {
            Ok(self.ttl)
        }
    }

    fn counting_cache(ttl: Duration) -> (ExpiringCache<Versioned>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let cache = ExpiringCache::new("test", move |_key: String| {
            let counter = counter.clone();
            async move {
                let version = counter.fetch_add(1, Ordering::SeqCst) + 1;
                Ok::<_, ResolverError>(Versioned { version, ttl })
            }
        });
        (cache, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_does_not_refetch() {
        let (cache, calls) = counting_cache(Duration::from_secs(60));

        assert_eq!(cache.get("a").await.unwrap().version, 1);
        assert_eq!(cache.get("a").await.unwrap().version, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_entry_after_refresh_is_reported() {
        let (cache, calls) = counting_cache(Duration::from_secs(60));

        // Simulate a refresh that completed without leaving an entry behind
        let slot = cache.slot("a").await;
        let guard = slot.lock.lock().await;

        let pending = cache.get("a");
        tokio::pin!(pending);
        assert!(futures::poll!(pending.as_mut()).is_pending());

        slot.refreshes.fetch_add(1, Ordering::Release);
        drop(guard);

        let err = pending.await.unwrap_err();
        assert!(matches!(
            err,
            ResolverError::CacheRefreshInconsistency { category: "test", .. }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    fn failing_cache(delay: Duration) -> (Arc<ExpiringCache<Versioned>>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let cache = ExpiringCache::new("test", move |key: String| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                Err::<Versioned, _>(ResolverError::NotFound(key))
            }
        });
        (Arc::new(cache), calls)
    }

    #[tokio::test(start_paused = true)]
    async fn test_slots_released_after_refresh() {
        let (cache, _) = failing_cache(Duration::ZERO);
        for i in 0..1000 {
            assert!(cache.get(&format!("missing-{}", i)).await.is_err());
        }
        assert!(cache.is_empty().await);
        assert_eq!(cache.pending_refreshes().await, 0);

        let (cache, calls) = counting_cache(Duration::from_secs(60));
        for i in 0..100 {
            cache.get(&format!("key-{}", i)).await.unwrap();
        }
        assert_eq!(cache.len().await, 100);
        assert_eq!(cache.pending_refreshes().await, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiters_share_failed_refresh() {
        let (cache, calls) = failing_cache(Duration::from_millis(100));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get("a").await })
            })
            .collect();

        for task in tasks {
            let err = task.await.unwrap().unwrap_err();
            match err {
                ResolverError::CacheFetchFailure { source, .. } => {
                    assert!(matches!(*source, ResolverError::NotFound(_)));
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.pending_refreshes().await, 0);

        // A later caller tries again
        assert!(cache.get("a").await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_lifetime_is_rejected() {
        let (cache, _) = counting_cache(Duration::ZERO);

        let err = cache.get("a").await.unwrap_err();
        assert!(matches!(err, ResolverError::InvalidLifetime { .. }));
        assert!(cache.is_empty().await);
    }
}
