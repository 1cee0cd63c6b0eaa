//! Cache Module
//!
//! Per-user, per-data-type caching with independent TTLs, bounded LRU
//! stores, hit/miss accounting and a near-expiry refresh signal.

mod data_type;
mod entry;
mod lru;
mod scoped;
mod stats;
mod store;


// Re-export public types
pub use data_type::{CacheConfig, ClassConfig, DataType, MAX_TTL};
pub use entry::{CacheEntry, CacheKey, CachedValue};
pub use lru::LruTracker;
pub use scoped::ScopedCache;
pub use stats::{format_hit_rate, CacheStats, ClassCounters};
pub use store::{ClassStore, Lookup};

// == Public Constants ==
/// Share of a class TTL after which a hit raises the refresh marker
pub const REFRESH_THRESHOLD_PERCENT: u32 = 80;
