//! Core cache implementation with per-entry TTL and pattern invalidation

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use regex::Regex;
use tracing::debug;

use super::config::CacheConfig;
use crate::resilience::{Clock, SystemClock};

/// Entry stored in the cache
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.inserted_at) >= self.ttl
    }
}

/// Thread-safe string-keyed cache with per-entry TTL
///
/// Expiry is lazy: an entry past its TTL is treated as a miss and removed
/// when read, but otherwise stays in memory until the next read of that
/// exact key or an invalidation pass.
///
/// # Type Parameters
/// - `V`: Value type (must be `Clone`)
/// - `C`: Clock type for time-based operations (defaults to `SystemClock`)
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use murmur_common::cache::{Cache, CacheConfig};
///
/// let cache: Cache<i32> = Cache::new(CacheConfig::default());
/// cache.insert_with_ttl("posts:1".to_string(), 42, Duration::from_secs(60));
/// assert_eq!(cache.get("posts:1"), Some(42));
/// ```
pub struct Cache<V, C = SystemClock>
where
    V: Clone,
    C: Clock,
{
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    config: CacheConfig,
    clock: C,
}

impl<V> Cache<V, SystemClock>
where
    V: Clone,
{
    /// Create a new cache with the given configuration using the system clock
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<V, C> Cache<V, C>
where
    V: Clone,
    C: Clock,
{
    /// Create a new cache with a custom clock (useful for testing)
    pub fn with_clock(config: CacheConfig, clock: C) -> Self {
        Self { entries: RwLock::new(HashMap::new()), config, clock }
    }

    /// Get a value from the cache
    ///
    /// Returns `None` if the key doesn't exist or the entry's TTL has
    /// elapsed. An expired entry is removed as part of the failed read.
    pub fn get(&self, key: &str) -> Option<V> {
        let expired = {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if entry.is_expired(self.clock.now()) => true,
                Some(entry) => return Some(entry.value.clone()),
                None => return None,
            }
        };

        if expired {
            let mut entries = self.entries.write();
            // Re-check under the write lock: the entry may have been
            // overwritten with a fresh value since the read.
            if let Some(entry) = entries.get(key) {
                if entry.is_expired(self.clock.now()) {
                    entries.remove(key);
                    debug!(key, "cache entry expired on read");
                } else {
                    return Some(entry.value.clone());
                }
            }
        }

        None
    }

    /// Insert a value with the configured default TTL
    ///
    /// Overwrites any existing entry unconditionally.
    pub fn insert(&self, key: String, value: V) {
        self.insert_with_ttl(key, value, self.config.default_ttl);
    }

    /// Insert a value with an explicit TTL
    ///
    /// Overwrites any existing entry unconditionally.
    pub fn insert_with_ttl(&self, key: String, value: V, ttl: Duration) {
        let entry = CacheEntry { value, inserted_at: self.clock.now(), ttl };
        self.entries.write().insert(key, entry);
    }

    /// Remove a single entry, returning its value if it was present
    pub fn remove(&self, key: &str) -> Option<V> {
        self.entries.write().remove(key).map(|e| e.value)
    }

    /// Remove every entry whose key matches the pattern
    ///
    /// The pattern is interpreted as a regular expression when it compiles;
    /// otherwise it falls back to plain substring matching. Returns the
    /// number of entries removed.
    pub fn invalidate(&self, pattern: &str) -> usize {
        let matcher: Box<dyn Fn(&str) -> bool> = match Regex::new(pattern) {
            Ok(regex) => Box::new(move |key: &str| regex.is_match(key)),
            Err(_) => {
                let needle = pattern.to_string();
                Box::new(move |key: &str| key.contains(&needle))
            }
        };

        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| !matcher(key));
        let removed = before - entries.len();
        debug!(pattern, removed, "cache invalidated by pattern");
        removed
    }

    /// Clear all entries from the cache
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Get the current number of entries (expired entries included until
    /// they are read or invalidated)
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache::core.
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::resilience::MockClock;

    fn ttl_cache(clock: &MockClock) -> Cache<i32, MockClock> {
        Cache::with_clock(CacheConfig::default(), clock.clone())
    }

    /// Validates insert and get round-trip plus miss on unknown key.
    #[test]
    fn test_insert_and_get() {
        let cache: Cache<i32> = Cache::new(CacheConfig::default());

        cache.insert("posts:1".to_string(), 42);
        cache.insert("posts:2".to_string(), 84);

        assert_eq!(cache.get("posts:1"), Some(42));
        assert_eq!(cache.get("posts:2"), Some(84));
        assert_eq!(cache.get("posts:3"), None);
        assert_eq!(cache.len(), 2);
    }

    /// Validates overwrite is unconditional.
    #[test]
    fn test_overwrite_existing() {
        let cache: Cache<i32> = Cache::new(CacheConfig::default());

        cache.insert("key".to_string(), 1);
        cache.insert("key".to_string(), 2);

        assert_eq!(cache.get("key"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    /// Validates TTL expiry: a hit before the TTL elapses, a miss after.
    #[test]
    fn test_ttl_expiry() {
        let clock = MockClock::new();
        let cache = ttl_cache(&clock);

        cache.insert_with_ttl("key".to_string(), 42, Duration::from_millis(100));
        assert_eq!(cache.get("key"), Some(42));

        clock.advance_millis(150);
        assert_eq!(cache.get("key"), None);
        // The failed read removed the stale entry.
        assert_eq!(cache.len(), 0);
    }

    /// Validates an entry is still served right up to (but not at) its TTL.
    #[test]
    fn test_ttl_boundary() {
        let clock = MockClock::new();
        let cache = ttl_cache(&clock);

        cache.insert_with_ttl("key".to_string(), 1, Duration::from_millis(100));

        clock.advance_millis(99);
        assert_eq!(cache.get("key"), Some(1));

        clock.advance_millis(1);
        assert_eq!(cache.get("key"), None);
    }

    /// Validates expired entries linger until read (lazy expiry, no sweep).
    #[test]
    fn test_lazy_expiry_keeps_unread_entries() {
        let clock = MockClock::new();
        let cache = ttl_cache(&clock);

        cache.insert_with_ttl("a".to_string(), 1, Duration::from_millis(10));
        cache.insert_with_ttl("b".to_string(), 2, Duration::from_millis(10));

        clock.advance_millis(50);

        // Nothing read yet, both stale entries still occupy memory.
        assert_eq!(cache.len(), 2);

        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.len(), 1);
    }

    /// Validates pattern invalidation removes only matching keys.
    #[test]
    fn test_invalidate_by_pattern() {
        let cache: Cache<i32> = Cache::new(CacheConfig::default());

        cache.insert("posts:1".to_string(), 1);
        cache.insert("posts:2".to_string(), 2);
        cache.insert("users:1".to_string(), 3);

        let removed = cache.invalidate("posts:");
        assert_eq!(removed, 2);

        assert_eq!(cache.get("posts:1"), None);
        assert_eq!(cache.get("posts:2"), None);
        assert_eq!(cache.get("users:1"), Some(3));
    }

    /// Validates regex patterns are honored when they compile.
    #[test]
    fn test_invalidate_regex() {
        let cache: Cache<i32> = Cache::new(CacheConfig::default());

        cache.insert("posts:1".to_string(), 1);
        cache.insert("posts:10".to_string(), 2);
        cache.insert("reposts:1".to_string(), 3);

        let removed = cache.invalidate("^posts:\\d$");
        assert_eq!(removed, 1);
        assert_eq!(cache.get("posts:10"), Some(2));
        assert_eq!(cache.get("reposts:1"), Some(3));
    }

    /// Validates an invalid regex falls back to substring matching.
    #[test]
    fn test_invalidate_invalid_regex_falls_back_to_substring() {
        let cache: Cache<i32> = Cache::new(CacheConfig::default());

        cache.insert("posts:[feed".to_string(), 1);
        cache.insert("users:1".to_string(), 2);

        // "[feed" is not a valid regex; substring semantics apply.
        let removed = cache.invalidate("[feed");
        assert_eq!(removed, 1);
        assert_eq!(cache.get("users:1"), Some(2));
    }

    /// Validates `clear` removes everything.
    #[test]
    fn test_clear() {
        let cache: Cache<i32> = Cache::new(CacheConfig::default());

        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        cache.clear();

        assert!(cache.is_empty());
    }

    /// Validates concurrent inserts from multiple threads land safely.
    #[test]
    fn test_thread_safety() {
        let cache: Arc<Cache<i32>> = Arc::new(Cache::new(CacheConfig::default()));
        let mut handles = vec![];

        for i in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for j in 0..10 {
                    cache.insert(format!("key-{i}-{j}"), i * 10 + j);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 80);
    }
}
