//! Class Store Module
//!
//! Bounded storage for one data class: HashMap entries with LRU tracking,
//! lazy TTL expiration and refresh markers.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::cache::{CacheEntry, CachedValue, ClassConfig, DataType, LruTracker};
use crate::error::{CacheError, Result};

// == Lookup ==
/// Outcome of reading one owner's entry.
#[derive(Debug)]
pub enum Lookup<V> {
    /// Entry found and within its TTL
    Fresh(CachedValue<V>),
    /// Entry found past its TTL; it has been removed
    Expired,
    /// No entry for the owner
    Absent,
}

// == Class Store ==
/// Storage for a single data class, keyed by owner id.
///
/// Not synchronized: `ScopedCache` wraps every store in its own mutex so the
/// check-expire-then-mutate sequences below run atomically.
#[derive(Debug)]
pub struct ClassStore<V> {
    data_type: DataType,
    config: ClassConfig,
    entries: HashMap<String, CacheEntry<V>>,
    lru: LruTracker<String>,
    /// Owners whose entry crossed the refresh threshold and has not been
    /// replaced since
    refresh_pending: HashSet<String>,
}

impl<V> ClassStore<V> {
    // == Constructor ==
    pub fn new(data_type: DataType, config: ClassConfig) -> Self {
        Self {
            data_type,
            config,
            entries: HashMap::new(),
            lru: LruTracker::new(),
            refresh_pending: HashSet::new(),
        }
    }

    // == Lookup ==
    /// Reads the owner's entry.
    ///
    /// Expired entries are removed and reported as `Expired`. A fresh entry
    /// becomes the most recently used one; if it is older than the refresh
    /// threshold its owner is marked for refresh, and `refresh_requested`
    /// is true only when this call placed the mark.
    pub fn lookup(&mut self, owner_id: &str) -> Lookup<V> {
        let Some(entry) = self.entries.get(owner_id) else {
            return Lookup::Absent;
        };

        if entry.is_expired(self.config.ttl) {
            self.remove(owner_id);
            return Lookup::Expired;
        }

        let value = Arc::clone(&entry.value);
        let age = entry.age();
        let refresh_requested = entry.is_stale(self.config.refresh_threshold())
            && self.refresh_pending.insert(owner_id.to_string());

        self.lru.touch(owner_id);

        Lookup::Fresh(CachedValue {
            value,
            age,
            refresh_requested,
        })
    }

    // == Insert ==
    /// Stores `value` for the owner, replacing any previous entry.
    ///
    /// A new owner in a full store first triggers removal of expired
    /// entries, then eviction of the least recently used one. Returns the
    /// evicted owner, if any. Replacing an entry clears its refresh mark.
    pub fn insert(&mut self, owner_id: &str, value: V) -> Result<Option<String>> {
        let is_overwrite = self.entries.contains_key(owner_id);
        let mut evicted = None;

        if !is_overwrite && self.entries.len() >= self.config.max_size {
            self.purge_expired();

            if self.entries.len() >= self.config.max_size {
                let Some(oldest) = self.lru.evict_oldest() else {
                    return Err(CacheError::CacheFull(format!(
                        "{} store cannot hold any entry",
                        self.data_type
                    )));
                };
                self.entries.remove(&oldest);
                self.refresh_pending.remove(&oldest);
                evicted = Some(oldest);
            }
        }

        self.entries
            .insert(owner_id.to_string(), CacheEntry::new(owner_id, value));
        self.lru.touch(owner_id);
        self.refresh_pending.remove(owner_id);

        Ok(evicted)
    }

    // == Remove ==
    /// Removes the owner's entry and its refresh mark. Returns true if an
    /// entry was present.
    pub fn remove(&mut self, owner_id: &str) -> bool {
        self.refresh_pending.remove(owner_id);
        if self.entries.remove(owner_id).is_some() {
            self.lru.remove(owner_id);
            true
        } else {
            false
        }
    }

    // == Purge Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub fn purge_expired(&mut self) -> usize {
        let ttl = self.config.ttl;
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(ttl))
            .map(|(owner, _)| owner.clone())
            .collect();

        for owner in &expired {
            self.remove(owner);
        }

        expired.len()
    }

    // == Refresh Marks ==
    /// Clears the owner's refresh mark. Returns true if it was set.
    pub fn complete_refresh(&mut self, owner_id: &str) -> bool {
        self.refresh_pending.remove(owner_id)
    }

    pub fn is_refresh_pending(&self, owner_id: &str) -> bool {
        self.refresh_pending.contains(owner_id)
    }

    /// Owners currently marked for refresh.
    pub fn pending_refreshes(&self) -> impl Iterator<Item = &str> {
        self.refresh_pending.iter().map(String::as_str)
    }

    pub fn pending_refresh_count(&self) -> usize {
        self.refresh_pending.len()
    }

    // == Clear ==
    /// Drops every entry and refresh mark.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.refresh_pending.clear();
    }

    // == Accessors ==
    pub fn config(&self) -> ClassConfig {
        self.config
    }

    /// Number of stored entries, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn store(max_size: usize, ttl: Duration) -> ClassStore<String> {
        ClassStore::new(DataType::Grades, ClassConfig::new(max_size, ttl))
    }

    fn fresh_value(lookup: Lookup<String>) -> Option<String> {
        match lookup {
            Lookup::Fresh(hit) => Some((*hit.value).clone()),
            _ => None,
        }
    }

    #[test]
    fn test_store_new() {
        let store = store(100, Duration::from_secs(300));
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_insert_and_lookup() {
        let mut store = store(100, Duration::from_secs(300));

        store.insert("u1", "grades-1".to_string()).unwrap();

        assert_eq!(fresh_value(store.lookup("u1")).as_deref(), Some("grades-1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_lookup_nonexistent() {
        let mut store = store(100, Duration::from_secs(300));
        assert!(matches!(store.lookup("nobody"), Lookup::Absent));
    }

    #[test]
    fn test_store_remove() {
        let mut store = store(100, Duration::from_secs(300));

        store.insert("u1", "v".to_string()).unwrap();
        assert!(store.remove("u1"));
        assert!(!store.remove("u1"));

        assert!(store.is_empty());
        assert!(matches!(store.lookup("u1"), Lookup::Absent));
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = store(100, Duration::from_secs(300));

        store.insert("u1", "old".to_string()).unwrap();
        store.insert("u1", "new".to_string()).unwrap();

        assert_eq!(fresh_value(store.lookup("u1")).as_deref(), Some("new"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = store(100, Duration::from_millis(100));

        store.insert("u1", "v".to_string()).unwrap();
        assert!(matches!(store.lookup("u1"), Lookup::Fresh(_)));

        sleep(Duration::from_millis(150));

        assert!(matches!(store.lookup("u1"), Lookup::Expired));
        // Expired entry is physically removed by the read
        assert!(store.is_empty());
        assert!(matches!(store.lookup("u1"), Lookup::Absent));
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = store(3, Duration::from_secs(300));

        store.insert("u1", "v1".to_string()).unwrap();
        store.insert("u2", "v2".to_string()).unwrap();
        store.insert("u3", "v3".to_string()).unwrap();

        let evicted = store.insert("u4", "v4".to_string()).unwrap();

        assert_eq!(evicted.as_deref(), Some("u1"));
        assert_eq!(store.len(), 3);
        assert!(matches!(store.lookup("u1"), Lookup::Absent));
        assert!(matches!(store.lookup("u4"), Lookup::Fresh(_)));
    }

    #[test]
    fn test_store_overwrite_at_capacity_does_not_evict() {
        let mut store = store(2, Duration::from_secs(300));

        store.insert("u1", "v1".to_string()).unwrap();
        store.insert("u2", "v2".to_string()).unwrap();
        let evicted = store.insert("u1", "v1b".to_string()).unwrap();

        assert!(evicted.is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_store_lru_touch_on_lookup() {
        let mut store = store(3, Duration::from_secs(300));

        store.insert("u1", "v1".to_string()).unwrap();
        store.insert("u2", "v2".to_string()).unwrap();
        store.insert("u3", "v3".to_string()).unwrap();

        let _ = store.lookup("u1");

        let evicted = store.insert("u4", "v4".to_string()).unwrap();
        assert_eq!(evicted.as_deref(), Some("u2"));
        assert!(matches!(store.lookup("u1"), Lookup::Fresh(_)));
    }

    #[test]
    fn test_store_full_prefers_expired_over_lru() {
        let mut store = store(2, Duration::from_millis(100));

        store.insert("u1", "v1".to_string()).unwrap();
        sleep(Duration::from_millis(150));
        store.insert("u2", "v2".to_string()).unwrap();

        // u1 expired, so no live entry has to be evicted
        let evicted = store.insert("u3", "v3".to_string()).unwrap();
        assert!(evicted.is_none());
        assert_eq!(store.len(), 2);
        assert!(matches!(store.lookup("u2"), Lookup::Fresh(_)));
        assert!(matches!(store.lookup("u3"), Lookup::Fresh(_)));
    }

    #[test]
    fn test_store_zero_capacity() {
        let mut store = store(0, Duration::from_secs(300));

        let result = store.insert("u1", "v".to_string());
        assert!(matches!(result, Err(CacheError::CacheFull(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_purge_expired() {
        let mut store = store(100, Duration::from_millis(100));

        store.insert("u1", "v1".to_string()).unwrap();
        sleep(Duration::from_millis(150));
        store.insert("u2", "v2".to_string()).unwrap();

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(matches!(store.lookup("u2"), Lookup::Fresh(_)));
    }

    #[test]
    fn test_refresh_mark_raised_once() {
        let mut store = store(10, Duration::from_millis(2000));
        store.insert("u1", "v".to_string()).unwrap();

        match store.lookup("u1") {
            Lookup::Fresh(hit) => assert!(!hit.refresh_requested),
            other => panic!("expected fresh entry, got {other:?}"),
        }

        // Past 80% of the TTL, before expiry
        sleep(Duration::from_millis(1650));

        match store.lookup("u1") {
            Lookup::Fresh(hit) => assert!(hit.refresh_requested),
            other => panic!("expected fresh entry, got {other:?}"),
        }
        match store.lookup("u1") {
            Lookup::Fresh(hit) => assert!(!hit.refresh_requested),
            other => panic!("expected fresh entry, got {other:?}"),
        }

        assert!(store.is_refresh_pending("u1"));
        assert_eq!(store.pending_refresh_count(), 1);
    }

    #[test]
    fn test_refresh_mark_cleared_by_insert_and_remove() {
        let mut store = store(10, Duration::from_millis(2000));
        store.insert("u1", "v".to_string()).unwrap();
        store.insert("u2", "v".to_string()).unwrap();
        sleep(Duration::from_millis(1650));

        let _ = store.lookup("u1");
        let _ = store.lookup("u2");
        assert_eq!(store.pending_refresh_count(), 2);

        store.insert("u1", "refreshed".to_string()).unwrap();
        assert!(!store.is_refresh_pending("u1"));

        store.remove("u2");
        assert!(!store.is_refresh_pending("u2"));
        assert_eq!(store.pending_refreshes().count(), 0);
    }

    #[test]
    fn test_complete_refresh() {
        let mut store = store(10, Duration::from_millis(2000));
        store.insert("u1", "v".to_string()).unwrap();
        sleep(Duration::from_millis(1650));
        let _ = store.lookup("u1");

        assert!(store.complete_refresh("u1"));
        assert!(!store.complete_refresh("u1"));

        // Next stale read raises the mark again
        match store.lookup("u1") {
            Lookup::Fresh(hit) => assert!(hit.refresh_requested),
            other => panic!("expected fresh entry, got {other:?}"),
        }
    }

    #[test]
    fn test_clear() {
        let mut store = store(10, Duration::from_secs(300));
        store.insert("u1", "v".to_string()).unwrap();
        store.insert("u2", "v".to_string()).unwrap();

        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.pending_refresh_count(), 0);
        assert!(matches!(store.lookup("u1"), Lookup::Absent));
    }
}
