//! Cache Entry Module
//!
//! Defines cache entries and the keys that address them.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::DataType;

// == Cache Key ==
/// Identifies at most one live entry: one owner's payload of one class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub data_type: DataType,
    pub owner_id: String,
}

impl CacheKey {
    pub fn new(owner_id: impl Into<String>, data_type: DataType) -> Self {
        Self {
            data_type,
            owner_id: owner_id.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.data_type, self.owner_id)
    }
}

// == Cache Entry ==
/// A stored payload with its creation time and owner.
///
/// Entries are never mutated after creation; a new `set` replaces them.
#[derive(Debug)]
pub struct CacheEntry<V> {
    /// The stored payload
    pub value: Arc<V>,
    /// When the entry was created
    pub cached_at: Instant,
    /// Owner the payload belongs to
    pub owner_id: String,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Wraps `value` into an entry stamped with the current time.
    pub fn new(owner_id: impl Into<String>, value: V) -> Self {
        Self {
            value: Arc::new(value),
            cached_at: Instant::now(),
            owner_id: owner_id.into(),
        }
    }

    // == Age ==
    /// Time elapsed since the entry was created.
    pub fn age(&self) -> Duration {
        self.cached_at.elapsed()
    }

    // == Is Expired ==
    /// An entry is expired once its age reaches `ttl`.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() >= ttl
    }

    // == Is Stale ==
    /// True when the entry is older than `threshold` but may still be fresh.
    pub fn is_stale(&self, threshold: Duration) -> bool {
        self.age() > threshold
    }
}

// == Cached Value ==
/// Result of a cache hit.
#[derive(Debug, Clone)]
pub struct CachedValue<V> {
    /// Shared handle to the stored payload
    pub value: Arc<V>,
    /// Entry age at lookup time
    pub age: Duration,
    /// Set when this lookup raised the refresh marker for the key.
    /// Callers should schedule a refetch when it is true.
    pub refresh_requested: bool,
}
