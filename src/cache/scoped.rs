//! Scoped Cache Module
//!
//! The shared per-user, per-data-type cache handed to every request handler.

use std::sync::{Mutex, MutexGuard};

use tracing::{debug, error, info, warn};

use crate::cache::store::{ClassStore, Lookup};
use crate::cache::{
    CacheConfig, CacheKey, CacheStats, CachedValue, ClassConfig, ClassCounters, DataType,
};
use crate::error::{CacheError, Result};

// == Class Slot ==
/// One data class: its store behind a mutex, and its counters beside it.
#[derive(Debug)]
struct ClassSlot<V> {
    data_type: DataType,
    store: Mutex<ClassStore<V>>,
    counters: ClassCounters,
}

// == Scoped Cache ==
/// Per-owner, per-class TTL cache with bounded LRU stores.
///
/// Safe to share between tasks behind an `Arc`; each data class has its own
/// lock so traffic on one class never waits on another. No method performs
/// I/O or blocks beyond a store lock.
///
/// Public operations never fail loudly. Unknown class names read as absent,
/// and internal faults are logged and reported as a miss or `false`.
#[derive(Debug)]
pub struct ScopedCache<V = serde_json::Value> {
    slots: [ClassSlot<V>; DataType::COUNT],
}

impl<V> ScopedCache<V> {
    // == Constructor ==
    /// Builds one empty store per data class using `config`'s limits.
    pub fn new(config: &CacheConfig) -> Self {
        let slots = DataType::ALL.map(|data_type| ClassSlot {
            data_type,
            store: Mutex::new(ClassStore::new(data_type, config.class(data_type))),
            counters: ClassCounters::new(),
        });

        info!(
            grades = ?config.class(DataType::Grades),
            courses = ?config.class(DataType::Courses),
            assignments = ?config.class(DataType::Assignments),
            tokens = ?config.class(DataType::Tokens),
            "Scoped cache initialized"
        );

        Self { slots }
    }

    fn slot(&self, data_type: DataType) -> &ClassSlot<V> {
        &self.slots[data_type.index()]
    }

    // == Lock ==
    /// Locks a class store.
    ///
    /// A poisoned lock means a holder panicked mid-update, so the store's
    /// contents can't be trusted: they are dropped, the poison is cleared and
    /// the current operation fails. The class then behaves as an empty cache.
    fn lock(slot: &ClassSlot<V>) -> Result<MutexGuard<'_, ClassStore<V>>> {
        match slot.store.lock() {
            Ok(guard) => Ok(guard),
            Err(poisoned) => {
                poisoned.into_inner().clear();
                slot.store.clear_poison();
                Err(CacheError::LockPoisoned(slot.data_type))
            }
        }
    }

    // == Get ==
    /// Returns the owner's payload for `data_type` if present and fresh.
    ///
    /// Every call counts as a hit or a miss for the class, including calls
    /// that hit an internal fault. A hit on an entry past 80% of its TTL
    /// raises the refresh marker for the key; `refresh_requested` on the
    /// result tells the caller it was the one to raise it.
    pub fn get(&self, owner_id: &str, data_type: DataType) -> Option<CachedValue<V>> {
        let slot = self.slot(data_type);
        let lookup = Self::lock(slot).map(|mut store| store.lookup(owner_id));

        match lookup {
            Ok(Lookup::Fresh(hit)) => {
                slot.counters.record_hit();
                debug!(owner = owner_id, %data_type, age_ms = hit.age.as_millis() as u64, "Cache hit");
                if hit.refresh_requested {
                    info!(owner = owner_id, %data_type, "Entry nearing expiry, refresh requested");
                }
                Some(hit)
            }
            Ok(Lookup::Expired) => {
                slot.counters.record_miss();
                debug!(owner = owner_id, %data_type, "Cache miss (expired)");
                None
            }
            Ok(Lookup::Absent) => {
                slot.counters.record_miss();
                debug!(owner = owner_id, %data_type, "Cache miss");
                None
            }
            Err(err) => {
                slot.counters.record_miss();
                error!(owner = owner_id, %data_type, error = %err, "Cache get failed, treating as miss");
                None
            }
        }
    }

    // == Set ==
    /// Stores `value` for the owner, replacing any previous entry.
    ///
    /// Returns false if the store could not take the entry; the failure is
    /// logged here. A successful set also completes any pending refresh for
    /// the key.
    pub fn set(&self, owner_id: &str, data_type: DataType, value: V) -> bool {
        let slot = self.slot(data_type);
        let inserted = Self::lock(slot).and_then(|mut store| store.insert(owner_id, value));

        match inserted {
            Ok(evicted) => {
                if let Some(evicted_owner) = evicted {
                    slot.counters.record_evictions(1);
                    debug!(owner = %evicted_owner, %data_type, "Evicted least recently used entry");
                }
                debug!(owner = owner_id, %data_type, "Cached entry");
                true
            }
            Err(err) => {
                error!(owner = owner_id, %data_type, error = %err, "Cache set failed");
                false
            }
        }
    }

    // == Invalidate ==
    /// Removes the owner's entry for `data_type`, or for every class when
    /// `data_type` is `None`. Other owners are never touched.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate(&self, owner_id: &str, data_type: Option<DataType>) -> usize {
        let removed = match data_type {
            Some(data_type) => usize::from(self.remove_one(owner_id, data_type)),
            None => DataType::ALL
                .into_iter()
                .filter(|&data_type| self.remove_one(owner_id, data_type))
                .count(),
        };

        match data_type {
            Some(data_type) => {
                info!(owner = owner_id, %data_type, removed, "Invalidated cache entry")
            }
            None => info!(owner = owner_id, removed, "Invalidated all cache entries for owner"),
        }

        removed
    }

    fn remove_one(&self, owner_id: &str, data_type: DataType) -> bool {
        match Self::lock(self.slot(data_type)) {
            Ok(mut store) => store.remove(owner_id),
            Err(err) => {
                // The poisoned store was emptied, so the entry is gone either way
                error!(owner = owner_id, %data_type, error = %err, "Cache invalidate failed");
                false
            }
        }
    }

    // == Refresh Markers ==
    /// Clears the refresh marker for the key without touching its entry.
    ///
    /// Refresh workers call this when a refetch fails so a later read can
    /// request another one. Returns true if a marker was present.
    pub fn complete_refresh(&self, owner_id: &str, data_type: DataType) -> bool {
        match Self::lock(self.slot(data_type)) {
            Ok(mut store) => store.complete_refresh(owner_id),
            Err(err) => {
                error!(owner = owner_id, %data_type, error = %err, "Refresh completion failed");
                false
            }
        }
    }

    pub fn is_refresh_pending(&self, owner_id: &str, data_type: DataType) -> bool {
        Self::lock(self.slot(data_type))
            .map(|store| store.is_refresh_pending(owner_id))
            .unwrap_or(false)
    }

    /// Keys whose refresh marker is currently raised.
    pub fn pending_refreshes(&self) -> Vec<CacheKey> {
        let mut keys = Vec::new();
        for slot in &self.slots {
            if let Ok(store) = Self::lock(slot) {
                keys.extend(
                    store
                        .pending_refreshes()
                        .map(|owner| CacheKey::new(owner, slot.data_type)),
                );
            }
        }
        keys
    }

    // == Stats ==
    /// Computes a fresh statistics snapshot.
    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();

        for slot in &self.slots {
            let (size, pending) = match Self::lock(slot) {
                Ok(store) => (store.len(), store.pending_refresh_count()),
                Err(err) => {
                    warn!(data_type = %slot.data_type, error = %err, "Stats read hit a poisoned store");
                    (0, 0)
                }
            };
            stats.record_class(slot.data_type, &slot.counters, size);
            stats.pending_refreshes += pending;
        }

        stats.finish()
    }

    /// Zeroes every hit, miss and eviction counter.
    pub fn reset_stats(&self) {
        for slot in &self.slots {
            slot.counters.reset();
        }
        info!("Cache statistics reset");
    }

    // == Clear All ==
    /// Empties every class store. Statistics are kept.
    pub fn clear_all(&self) {
        for slot in &self.slots {
            if let Ok(mut store) = Self::lock(slot) {
                store.clear();
            }
        }
        info!("All caches cleared");
    }

    // == Purge Expired ==
    /// Physically removes expired entries from every class.
    ///
    /// Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        self.slots
            .iter()
            .map(|slot| match Self::lock(slot) {
                Ok(mut store) => store.purge_expired(),
                Err(err) => {
                    error!(data_type = %slot.data_type, error = %err, "Expired entry purge failed");
                    0
                }
            })
            .sum()
    }

    // == Accessors ==
    /// Entries held for `data_type`, including expired ones not yet removed.
    pub fn len(&self, data_type: DataType) -> usize {
        Self::lock(self.slot(data_type))
            .map(|store| store.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        DataType::ALL.into_iter().all(|data_type| self.len(data_type) == 0)
    }

    pub fn class_config(&self, data_type: DataType) -> ClassConfig {
        Self::lock(self.slot(data_type))
            .map(|store| store.config())
            .unwrap_or_else(|_| data_type.default_config())
    }

    // == By-Name Entry Points ==
    /// `get` for a class given by name. Unknown names read as absent and
    /// leave the statistics untouched.
    pub fn get_by_name(&self, owner_id: &str, data_type: &str) -> Option<CachedValue<V>> {
        let data_type = parse_known(data_type)?;
        self.get(owner_id, data_type)
    }

    /// `set` for a class given by name. Unknown names return false without
    /// touching any store.
    pub fn set_by_name(&self, owner_id: &str, data_type: &str, value: V) -> bool {
        parse_known(data_type).is_some_and(|data_type| self.set(owner_id, data_type, value))
    }

    /// `invalidate` for a class given by name. Unknown names remove nothing.
    pub fn invalidate_by_name(&self, owner_id: &str, data_type: &str) -> usize {
        parse_known(data_type).map_or(0, |data_type| self.invalidate(owner_id, Some(data_type)))
    }
}

impl<V> Default for ScopedCache<V> {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

fn parse_known(name: &str) -> Option<DataType> {
    match name.parse() {
        Ok(data_type) => Some(data_type),
        Err(err) => {
            debug!(error = %err, "Ignoring cache operation for unknown data type");
            None
        }
    }
}
