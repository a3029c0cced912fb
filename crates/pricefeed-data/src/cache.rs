//! Time-expiring, size-bounded cache.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Longest TTL honoured; larger values are clamped so expiry never overflows.
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    #[inline]
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// In-memory cache whose entries expire after a per-entry TTL.
///
/// Reads past expiry report the key as absent even before the entry is
/// physically removed. Every write first sweeps expired entries and, if the
/// store is still at capacity, drops the soonest-expiring tenth of it, so the
/// size bound holds without a background task.
pub struct ExpiringCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    max_size: usize,
}

impl<V: Clone> ExpiringCache<V> {
    /// Create a cache holding at most `max_size` entries (minimum one).
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_size: max_size.max(1),
        }
    }

    /// Get a live value.
    pub fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| entry.is_live(Instant::now()))
            .map(|entry| entry.value.clone())
    }

    /// Insert or overwrite a value that lives for `ttl`.
    pub fn put(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        Self::sweep_expired(&mut entries, now);
        if entries.len() >= self.max_size {
            Self::evict_soonest(&mut entries);
        }

        entries.insert(
            key.into(),
            CacheEntry {
                value,
                expires_at: now + ttl.min(MAX_TTL),
            },
        );
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Check if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacity bound.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    fn sweep_expired(entries: &mut HashMap<String, CacheEntry<V>>, now: Instant) {
        entries.retain(|_, entry| entry.is_live(now));
    }

    /// Remove the soonest-expiring 10% of entries, at least one.
    fn evict_soonest(entries: &mut HashMap<String, CacheEntry<V>>) {
        if entries.is_empty() {
            return;
        }

        // O(n log n) per capacity breach; fine at a few thousand entries.
        let mut by_expiry: Vec<(Instant, String)> = entries
            .iter()
            .map(|(key, entry)| (entry.expires_at, key.clone()))
            .collect();
        by_expiry.sort_unstable_by_key(|(expires_at, _)| *expires_at);

        let to_remove = (by_expiry.len() / 10).max(1);
        for (_, key) in by_expiry.into_iter().take(to_remove) {
            entries.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const LONG: Duration = Duration::from_secs(300);

    #[test]
    fn test_get_after_put() {
        let cache = ExpiringCache::new(10);
        cache.put("AAPL", 150.0, LONG);

        assert_eq!(cache.get("AAPL"), Some(150.0));
        assert_eq!(cache.get("MSFT"), None);
    }

    #[test]
    fn test_entry_expires() {
        let cache = ExpiringCache::new(10);
        cache.put("AAPL", 150.0, Duration::from_millis(1));

        thread::sleep(Duration::from_millis(10));

        assert_eq!(cache.get("AAPL"), None);
        // Lazily expired: still stored until the next write sweeps it.
        assert_eq!(cache.len(), 1);

        cache.put("MSFT", 300.0, LONG);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("MSFT"), Some(300.0));
    }

    #[test]
    fn test_zero_ttl_is_never_readable() {
        let cache = ExpiringCache::new(10);
        cache.put("AAPL", 150.0, Duration::ZERO);

        assert_eq!(cache.get("AAPL"), None);
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let cache = ExpiringCache::new(10);
        cache.put("AAPL", 150.0, LONG);
        cache.put("AAPL", 151.0, LONG);

        assert_eq!(cache.get("AAPL"), Some(151.0));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_capacity_evicts_soonest_expiring() {
        let cache = ExpiringCache::new(10);
        for i in 0..10u64 {
            // Key 0 expires first, key 9 last.
            cache.put(format!("SYM{}", i), i, LONG + Duration::from_secs(i));
        }
        assert_eq!(cache.len(), 10);

        cache.put("NEW", 99, LONG * 2);

        assert!(cache.len() <= cache.max_size());
        assert_eq!(cache.get("SYM0"), None);
        assert_eq!(cache.get("NEW"), Some(99));
        for i in 1..10u64 {
            assert_eq!(cache.get(&format!("SYM{}", i)), Some(i));
        }
    }

    #[test]
    fn test_capacity_evicts_a_tenth() {
        let cache = ExpiringCache::new(100);
        for i in 0..100u64 {
            cache.put(format!("SYM{}", i), i, LONG + Duration::from_secs(i));
        }

        cache.put("NEW", 0, LONG * 2);

        assert_eq!(cache.len(), 91);
        for i in 0..10u64 {
            assert_eq!(cache.get(&format!("SYM{}", i)), None);
        }
        assert_eq!(cache.get("SYM10"), Some(10));
    }

    #[test]
    fn test_many_inserts_stay_bounded() {
        let cache = ExpiringCache::new(25);
        for i in 0..500u64 {
            cache.put(format!("SYM{}", i), i, LONG);
            assert!(cache.len() <= 25);
        }
    }

    #[test]
    fn test_clear() {
        let cache = ExpiringCache::new(10);
        cache.put("AAPL", 150.0, LONG);
        cache.put("MSFT", 300.0, LONG);

        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.get("AAPL"), None);
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let cache = ExpiringCache::new(10);
        cache.put("AAPL", 150.0, Duration::MAX);

        assert_eq!(cache.get("AAPL"), Some(150.0));
    }

    #[test]
    fn test_concurrent_readers_and_writers() {
        let cache = std::sync::Arc::new(ExpiringCache::new(50));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for i in 0..200u64 {
                        cache.put(format!("T{}-{}", t, i), i, LONG);
                        let _ = cache.get(&format!("T{}-{}", t, i / 2));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert!(cache.len() <= 50);
    }
}
