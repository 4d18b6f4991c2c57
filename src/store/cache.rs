//! In-memory TTL cache for store lookups.
//!
//! Entries are stamped with the time they were written and treated as
//! missing once older than the TTL. Expired entries are evicted when read
//! and swept on every write. Time comes from an injected [`Clock`] so tests
//! can move it by hand.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Source of "now" for expiry decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Thread-safe key/value cache with a fixed time-to-live.
#[derive(Clone)]
pub struct TtlCache<V> {
    inner: Arc<RwLock<HashMap<String, Entry<V>>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

impl<V: Clone + Send + Sync> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        TtlCache {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`, if any.
    pub async fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        {
            let inner = self.inner.read().await;
            match inner.get(key) {
                Some(entry) if now.duration_since(entry.stored_at) < self.ttl => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: re-check under the write lock, a writer may have refreshed it
        let mut inner = self.inner.write().await;
        if let Some(entry) = inner.get(key) {
            if now.duration_since(entry.stored_at) < self.ttl {
                return Some(entry.value.clone());
            }
            inner.remove(key);
            debug!("cache: evicted expired entry {}", key);
        }
        None
    }

    /// Store `value` under `key`, dropping every entry that has expired
    /// meanwhile.
    pub async fn set(&self, key: impl Into<String>, value: V) {
        let stored_at = self.clock.now();
        let mut inner = self.inner.write().await;
        let before = inner.len();
        inner.retain(|_, entry| stored_at.duration_since(entry.stored_at) < self.ttl);
        let swept = before - inner.len();
        if swept > 0 {
            debug!("cache: swept {} expired entries", swept);
        }
        inner.insert(key.into(), Entry { value, stored_at });
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    /// Number of entries held, expired or not.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Clock that only moves when told to.
    pub(crate) struct ManualClock {
        now: Mutex<Instant>,
    }

    impl ManualClock {
        pub(crate) fn new() -> Arc<Self> {
            Arc::new(ManualClock {
                now: Mutex::new(Instant::now()),
            })
        }

        pub(crate) fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.now.lock().unwrap()
        }
    }

    #[tokio::test]
    async fn test_hit_before_ttl() {
        let clock = ManualClock::new();
        let cache = TtlCache::with_clock(Duration::from_secs(900), clock.clone());
        cache.set("leagues", vec![1, 2, 3]).await;
        clock.advance(Duration::from_secs(899));
        assert_eq!(cache.get("leagues").await, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_expired_entry_is_missing_and_evicted() {
        let clock = ManualClock::new();
        let cache = TtlCache::with_clock(Duration::from_secs(900), clock.clone());
        cache.set("team:1", "Inter".to_string()).await;
        clock.advance(Duration::from_secs(900));
        assert_eq!(cache.get("team:1").await, None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_writes_sweep_expired_keys_never_read_again() {
        let clock = ManualClock::new();
        let cache = TtlCache::with_clock(Duration::from_secs(60), clock.clone());
        cache.set("team:1", 1).await;
        cache.set("team:2", 2).await;
        clock.advance(Duration::from_secs(30));
        cache.set("team:3", 3).await;
        clock.advance(Duration::from_secs(40));
        cache.set("team:4", 4).await;
        // 1 and 2 are 70s old, 3 is 40s old
        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("team:3").await, Some(3));
    }

    #[tokio::test]
    async fn test_set_refreshes_timestamp() {
        let clock = ManualClock::new();
        let cache = TtlCache::with_clock(Duration::from_secs(60), clock.clone());
        cache.set("k", 1).await;
        clock.advance(Duration::from_secs(50));
        cache.set("k", 2).await;
        clock.advance(Duration::from_secs(50));
        assert_eq!(cache.get("k").await, Some(2));
    }

    #[tokio::test]
    async fn test_unknown_key_and_clear() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));
        assert_eq!(cache.get("nope").await, None);
        cache.set("a", 1).await;
        cache.clear().await;
        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.ttl(), Duration::from_secs(60));
    }
}
