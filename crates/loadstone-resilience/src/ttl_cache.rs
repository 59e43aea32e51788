//! Bounded TTL cache with insertion-order eviction.
//!
//! Expiry is checked lazily on read; there is no background sweep and reads
//! never extend TTL. The eviction policy is FIFO by insertion order — the
//! least-recently-*inserted* live entry is the victim, and reads do not
//! reorder. Callers must not assume LRU semantics.

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tracing::debug;

/// A cached value with its expiry instant.
///
/// Owned exclusively by the cache that created it; an update replaces the
/// entry wholesale.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    stored_at: Instant,
    expires_at: Option<Instant>,
}

impl<T> CacheEntry<T> {
    fn new(value: T, ttl: Option<Duration>) -> Self {
        let stored_at = Instant::now();
        Self {
            value,
            stored_at,
            expires_at: ttl.map(|ttl| stored_at + ttl),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Total cache hits
    pub hits: u64,
    /// Total cache misses (including expired reads)
    pub misses: u64,
    /// Entries removed by capacity pressure
    pub evictions: u64,
    /// Entries removed because they were read past expiry
    pub expirations: u64,
}

impl CacheStats {
    /// Hit rate as a percentage
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64 * 100.0
        }
    }
}

#[derive(Debug)]
struct CacheInner<T> {
    entries: HashMap<String, CacheEntry<T>>,
    /// Live keys in insertion order, oldest first
    order: VecDeque<String>,
    stats: CacheStats,
}

/// Bounded key→value store with per-entry TTL.
///
/// One instance per resource category, living for the process lifetime.
/// Invariant: `len() <= max_capacity` after any insertion.
#[derive(Debug)]
pub struct TtlCache<T> {
    name: &'static str,
    max_capacity: usize,
    inner: Mutex<CacheInner<T>>,
}

impl<T: Clone> TtlCache<T> {
    /// Create a cache bounded to `max_capacity` entries.
    ///
    /// `name` labels this resource category in logs.
    ///
    /// # Panics
    /// Panics if `max_capacity` is zero.
    #[must_use]
    pub fn new(name: &'static str, max_capacity: usize) -> Self {
        assert!(max_capacity > 0, "cache capacity must be at least 1");
        Self {
            name,
            max_capacity,
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
                stats: CacheStats::default(),
            }),
        }
    }

    /// Get a stored value if present and fresh.
    ///
    /// An expired entry is removed and counted as a miss.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<T> {
        let now = Instant::now();
        let mut inner = self.inner.lock();

        let lookup = match inner.entries.get(key) {
            Some(entry) if entry.is_expired(now) => None,
            Some(entry) => Some((entry.value.clone(), now.duration_since(entry.stored_at))),
            None => {
                inner.stats.misses += 1;
                debug!(cache = self.name, key, "Cache miss");
                return None;
            }
        };

        match lookup {
            Some((value, age)) => {
                inner.stats.hits += 1;
                debug!(cache = self.name, key, age_ms = age.as_millis(), "Cache hit");
                Some(value)
            }
            None => {
                inner.entries.remove(key);
                inner.order.retain(|k| k != key);
                inner.stats.misses += 1;
                inner.stats.expirations += 1;
                debug!(cache = self.name, key, "Cache miss (expired)");
                None
            }
        }
    }

    /// Insert or replace a value.
    ///
    /// `ttl = None` stores the entry without expiry. Replacing an existing
    /// key moves it to the back of the insertion order. Inserting a new key
    /// at capacity first evicts the oldest-inserted live entry.
    pub fn set(&self, key: &str, value: T, ttl: Option<Duration>) {
        let mut inner = self.inner.lock();

        if inner.entries.contains_key(key) {
            inner.order.retain(|k| k != key);
        } else if inner.entries.len() >= self.max_capacity {
            if let Some(victim) = inner.order.pop_front() {
                inner.entries.remove(&victim);
                inner.stats.evictions += 1;
                debug!(cache = self.name, key = %victim, "Evicted oldest entry");
            }
        }

        inner.entries.insert(key.to_string(), CacheEntry::new(value, ttl));
        inner.order.push_back(key.to_string());

        debug!(
            cache = self.name,
            key,
            entries = inner.entries.len(),
            ttl_ms = ttl.map(|t| t.as_millis()),
            "Cache insert"
        );
    }

    /// Number of stored entries (including not-yet-observed expired ones)
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether the cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Remove all entries unconditionally
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
        debug!(cache = self.name, "Cache cleared");
    }

    /// Snapshot of the cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_fresh_hit_before_ttl() {
        let cache = TtlCache::new("test", 10);
        cache.set("k", 1, Some(Duration::from_secs(60)));
        assert_eq!(cache.get("k"), Some(1));
    }

    #[test]
    fn test_expiry_on_read_removes_entry() {
        let cache = TtlCache::new("test", 10);
        cache.set("k", 1, Some(Duration::from_millis(20)));
        assert_eq!(cache.len(), 1);

        sleep(Duration::from_millis(40));

        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.len(), 0);

        let stats = cache.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_reads_do_not_extend_ttl() {
        let cache = TtlCache::new("test", 10);
        cache.set("k", 1, Some(Duration::from_millis(50)));

        sleep(Duration::from_millis(30));
        assert_eq!(cache.get("k"), Some(1));

        sleep(Duration::from_millis(30));
        // Past the original expiry despite the intervening read
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_no_expiry_entries_persist() {
        let cache = TtlCache::new("test", 10);
        cache.set("k", 1, None);
        sleep(Duration::from_millis(20));
        assert_eq!(cache.get("k"), Some(1));
    }

    #[test]
    fn test_capacity_bound_holds() {
        let cache = TtlCache::new("test", 3);
        for i in 0..5 {
            cache.set(&format!("k{i}"), i, None);
            assert!(cache.len() <= 3);
        }
    }

    #[test]
    fn test_first_inserted_is_evicted() {
        let cache = TtlCache::new("test", 2);
        cache.set("a", 1, None);
        cache.set("b", 2, None);
        cache.set("c", 3, None);

        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), Some(3));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_reads_do_not_reorder_eviction() {
        let cache = TtlCache::new("test", 2);
        cache.set("a", 1, None);
        cache.set("b", 2, None);

        // FIFO, not LRU: reading "a" does not protect it
        assert_eq!(cache.get("a"), Some(1));
        cache.set("c", 3, None);

        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
    }

    #[test]
    fn test_reinsert_replaces_and_moves_to_back() {
        let cache = TtlCache::new("test", 2);
        cache.set("a", 1, None);
        cache.set("b", 2, None);
        cache.set("a", 10, None);

        // "b" is now the oldest insertion
        cache.set("c", 3, None);
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a"), Some(10));
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn test_clear() {
        let cache = TtlCache::new("test", 10);
        cache.set("a", 1, None);
        cache.set("b", 2, None);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_hit_rate() {
        let cache = TtlCache::new("test", 10);
        assert!((cache.stats().hit_rate() - 0.0).abs() < f64::EPSILON);

        cache.set("k", 1, None);
        let _ = cache.get("k");
        let _ = cache.get("missing");

        assert!((cache.stats().hit_rate() - 50.0).abs() < 0.1);
    }
}
