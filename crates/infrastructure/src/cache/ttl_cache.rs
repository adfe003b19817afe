//! Bounded in-memory cache with per-entry expiry
//!
//! Entries are fresh for `ttl` after insertion. A stale entry is dropped the
//! first time it is read. When the table is full, inserting a new key evicts
//! the single entry with the oldest insertion time.
//!
//! Every time-dependent operation has an `*_at` variant taking the current
//! instant explicitly, which keeps expiry testable without sleeping.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

/// Hit/miss counters and current size
///
/// Observability only; no behavior depends on these numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Reads that returned a fresh value
    pub hits: u64,
    /// Reads that found nothing or a stale value
    pub misses: u64,
    /// Entries currently stored (fresh or not yet purged)
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of reads served from the cache
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    data: V,
    stored_at: Instant,
}

/// Key/value store with TTL expiry and oldest-first eviction
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V> std::fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("entries", &self.entries.lock().len())
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache holding at most `capacity` entries (minimum 1)
    #[must_use]
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::with_capacity(capacity.min(1024))),
            ttl,
            capacity: capacity.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Configured time-to-live
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Configured maximum number of entries
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Fresh value for `key`, if any
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Fresh value for `key` as of `now`; a stale entry is removed
    pub fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let mut entries = self.entries.lock();

        let fresh = match entries.get(key) {
            Some(entry) if now.saturating_duration_since(entry.stored_at) < self.ttl => {
                Some(entry.data.clone())
            },
            Some(_) => {
                entries.remove(key);
                debug!(key = %key, "Cache entry expired");
                None
            },
            None => None,
        };
        drop(entries);

        if fresh.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache miss");
        }
        fresh
    }

    /// Store `value` under `key`, stamped with the current instant
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_at(key, value, Instant::now());
    }

    /// Store `value` under `key`, stamped with `now`
    ///
    /// Inserting a new key into a full cache first evicts the entry with the
    /// oldest insertion time. Overwriting an existing key never evicts. A zero
    /// TTL disables storage entirely.
    pub fn set_at(&self, key: impl Into<String>, value: V, now: Instant) {
        if self.ttl.is_zero() {
            return;
        }
        let key = key.into();
        let mut entries = self.entries.lock();

        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
                debug!(key = %oldest, "Cache entry evicted");
            }
        }

        entries.insert(
            key,
            CacheEntry {
                data: value,
                stored_at: now,
            },
        );
    }

    /// Drop `key` if present
    pub fn invalidate(&self, key: &str) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    /// Drop every entry that is stale as of now, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    /// Drop every entry that is stale as of `now`
    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| now.saturating_duration_since(entry.stored_at) < self.ttl);
        let removed = before - entries.len();
        drop(entries);

        if removed > 0 {
            debug!(removed, "Purged expired cache entries");
        }
        removed
    }

    /// Remove all entries; counters are kept
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of stored entries, including stale ones not yet purged
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True if nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Current counters
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIVE_MINUTES: Duration = Duration::from_secs(300);

    #[test]
    fn set_then_get_returns_value() {
        let cache = TtlCache::new(FIVE_MINUTES, 10);
        cache.set("current_london", 42);
        assert_eq!(cache.get("current_london"), Some(42));
    }

    #[test]
    fn entry_expires_after_ttl() {
        let cache = TtlCache::new(FIVE_MINUTES, 10);
        let t0 = Instant::now();
        cache.set_at("k", "v", t0);

        assert_eq!(cache.get_at("k", t0 + Duration::from_secs(299)), Some("v"));
        assert_eq!(cache.get_at("k", t0 + FIVE_MINUTES + Duration::from_secs(1)), None);
        // Stale entry was dropped on read
        assert!(cache.is_empty());
    }

    #[test]
    fn entry_is_stale_exactly_at_ttl() {
        let cache = TtlCache::new(FIVE_MINUTES, 10);
        let t0 = Instant::now();
        cache.set_at("k", 1, t0);
        assert_eq!(cache.get_at("k", t0 + FIVE_MINUTES), None);
    }

    #[test]
    fn overflow_evicts_single_oldest() {
        let cache = TtlCache::new(FIVE_MINUTES, 3);
        let t0 = Instant::now();
        cache.set_at("a", 1, t0);
        cache.set_at("b", 2, t0 + Duration::from_secs(1));
        cache.set_at("c", 3, t0 + Duration::from_secs(2));

        cache.set_at("d", 4, t0 + Duration::from_secs(3));
        let now = t0 + Duration::from_secs(4);
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get_at("a", now), None);
        assert_eq!(cache.get_at("b", now), Some(2));
        assert_eq!(cache.get_at("c", now), Some(3));
        assert_eq!(cache.get_at("d", now), Some(4));

        cache.set_at("e", 5, t0 + Duration::from_secs(5));
        assert_eq!(cache.get_at("b", now), None);
        assert_eq!(cache.get_at("c", now), Some(3));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn overwrite_does_not_evict() {
        let cache = TtlCache::new(FIVE_MINUTES, 2);
        let t0 = Instant::now();
        cache.set_at("a", 1, t0);
        cache.set_at("b", 2, t0 + Duration::from_secs(1));
        cache.set_at("a", 10, t0 + Duration::from_secs(2));

        let now = t0 + Duration::from_secs(3);
        assert_eq!(cache.get_at("a", now), Some(10));
        assert_eq!(cache.get_at("b", now), Some(2));

        // "b" is now the oldest
        cache.set_at("c", 3, t0 + Duration::from_secs(4));
        assert_eq!(cache.get_at("b", now), None);
        assert_eq!(cache.get_at("a", now), Some(10));
    }

    #[test]
    fn zero_capacity_is_treated_as_one() {
        let cache = TtlCache::new(FIVE_MINUTES, 0);
        assert_eq!(cache.capacity(), 1);
        cache.set("a", 1);
        cache.set("b", 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("b"), Some(2));
    }

    #[test]
    fn stats_count_hits_and_misses() {
        let cache = TtlCache::new(FIVE_MINUTES, 10);
        cache.set("a", 1);
        let _ = cache.get("a");
        let _ = cache.get("a");
        let _ = cache.get("missing");

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert!((stats.hit_rate() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn purge_removes_only_stale_entries() {
        let cache = TtlCache::new(FIVE_MINUTES, 10);
        let t0 = Instant::now();
        cache.set_at("old", 1, t0);
        cache.set_at("new", 2, t0 + Duration::from_secs(200));

        let removed = cache.purge_expired_at(t0 + Duration::from_secs(301));
        assert_eq!(removed, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_and_clear() {
        let cache = TtlCache::new(FIVE_MINUTES, 10);
        cache.set("a", 1);
        cache.set("b", 2);
        assert!(cache.invalidate("a"));
        assert!(!cache.invalidate("a"));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_ttl_stores_nothing() {
        let cache = TtlCache::new(Duration::ZERO, 10);
        cache.set("a", 1);
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn empty_stats_have_zero_hit_rate() {
        let cache: TtlCache<u8> = TtlCache::new(FIVE_MINUTES, 1);
        assert!(cache.stats().hit_rate().abs() < f64::EPSILON);
    }
}
