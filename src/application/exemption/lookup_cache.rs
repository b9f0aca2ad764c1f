//! Per-VRN cache for registry answers, with its own TTL and explicit eviction.
//!
//! Separate from the chargeability cache: evicting here only forces the next
//! lookup to hit the registry again.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::shared::vrn::matching_key;

/// Anything the cache-invalidation facade can flush.
pub trait EvictableCache: Send + Sync {
    fn evict_all(&self);
}

struct Cached<V> {
    value: Option<V>,
    stored_at: Instant,
}

/// Caches both hits and confirmed absences (`None`).
pub struct LookupCache<V> {
    ttl: Duration,
    entries: DashMap<String, Cached<V>>,
}

impl<V: Clone + Send + Sync> LookupCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    /// `None` on miss or expiry; `Some(None)` for a cached absence.
    pub fn get(&self, vrn: &str) -> Option<Option<V>> {
        let key = matching_key(vrn);
        let fresh = {
            let entry = self.entries.get(&key)?;
            if entry.stored_at.elapsed() <= self.ttl {
                Some(entry.value.clone())
            } else {
                None
            }
        };
        if fresh.is_none() {
            self.entries.remove(&key);
        }
        fresh
    }

    pub fn insert(&self, vrn: &str, value: Option<V>) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries.insert(
            matching_key(vrn),
            Cached {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, vrn: &str) {
        self.entries.remove(&matching_key(vrn));
    }

    pub fn invalidate_all(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone + Send + Sync> EvictableCache for LookupCache<V> {
    fn evict_all(&self) {
        self.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caches_hits_and_absences_by_matching_key() {
        let cache = LookupCache::new(Duration::from_secs(60));
        cache.insert("0CAS312", Some(1));
        cache.insert("AB1", None);

        assert_eq!(cache.get("CAS312"), Some(Some(1)));
        assert_eq!(cache.get("ab 1"), Some(None));
        assert_eq!(cache.get("ZZ9"), None);
    }

    #[test]
    fn expired_entries_are_dropped() {
        let cache = LookupCache::new(Duration::from_millis(1));
        cache.insert("CAS312", Some(1));
        std::thread::sleep(Duration::from_millis(5));

        assert_eq!(cache.get("CAS312"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn explicit_invalidation() {
        let cache = LookupCache::new(Duration::from_secs(60));
        cache.insert("A1", Some("x"));
        cache.insert("B2", Some("y"));

        cache.invalidate("A1");
        assert_eq!(cache.get("A1"), None);
        assert_eq!(cache.len(), 1);

        cache.evict_all();
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_ttl_disables_caching() {
        let cache = LookupCache::new(Duration::ZERO);
        cache.insert("A1", Some(1));
        assert!(cache.is_empty());
    }
}
