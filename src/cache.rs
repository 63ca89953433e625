//! Total-count memoization
//!
//! Counting matching action traces is the expensive half of a paged
//! response, so totals for the cacheable routes are memoized per
//! canonical filter key with LRU eviction and a wall-clock TTL.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;

pub const DEFAULT_CAPACITY: usize = 300;
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

struct CachedCount {
    total: u64,
    cached_at: Instant,
}

/// LRU cache of filter key to matched-document total.
///
/// Entries expire `time_to_live` after insertion; an expired entry is
/// removed on lookup and reads as a miss. A zero total is a valid cached
/// value and is served like any other.
pub struct CountCache {
    entries: Mutex<LruCache<String, CachedCount>>,
    time_to_live: Duration,
}

impl CountCache {
    pub fn new(capacity: NonZeroUsize, time_to_live: Duration) -> Self {
        CountCache {
            entries: Mutex::new(LruCache::new(capacity)),
            time_to_live,
        }
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get(key) {
            if entry.cached_at.elapsed() < self.time_to_live {
                return Some(entry.total);
            }
        }
        entries.pop(key);
        None
    }

    pub fn put(&self, key: String, total: u64) {
        let mut entries = self.entries.lock();
        entries.put(
            key,
            CachedCount {
                total,
                cached_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for CountCache {
    fn default() -> Self {
        CountCache::new(
            NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            DEFAULT_TTL,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn cache_of(capacity: usize, ttl: Duration) -> CountCache {
        CountCache::new(NonZeroUsize::new(capacity).unwrap(), ttl)
    }

    #[test]
    fn test_get_returns_cached_total() {
        let cache = cache_of(10, Duration::from_secs(60));
        cache.put("a".to_string(), 42);
        assert_eq!(cache.get("a"), Some(42));
        assert_eq!(cache.get("b"), None);
    }

    #[test]
    fn test_zero_total_is_a_hit() {
        let cache = cache_of(10, Duration::from_secs(60));
        cache.put("empty".to_string(), 0);
        assert_eq!(cache.get("empty"), Some(0));
    }

    #[test]
    fn test_expired_entry_reads_as_miss_and_is_dropped() {
        let cache = cache_of(10, Duration::from_millis(20));
        cache.put("a".to_string(), 1);
        thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get("a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let cache = cache_of(2, Duration::from_secs(60));
        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);
        // touch "a" so "b" becomes the eviction candidate
        assert_eq!(cache.get("a"), Some(1));
        cache.put("c".to_string(), 3);

        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("c"), Some(3));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_put_refreshes_existing_entry() {
        let cache = cache_of(10, Duration::from_secs(60));
        cache.put("a".to_string(), 1);
        cache.put("a".to_string(), 2);
        assert_eq!(cache.get("a"), Some(2));
        assert_eq!(cache.len(), 1);
    }
}
