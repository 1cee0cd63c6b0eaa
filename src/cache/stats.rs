//! Cache Statistics Module
//!
//! Per-class hit, miss and eviction counters, and the snapshot exposed on
//! the stats endpoint.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::DataType;

// == Class Counters ==
/// Lock-free counters for one data class.
///
/// Counters only grow until `reset` is called.
#[derive(Debug, Default)]
pub struct ClassCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl ClassCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_evictions(&self, count: u64) {
        if count > 0 {
            self.evictions.fetch_add(count, Ordering::Relaxed);
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
    }
}

// == Cache Stats ==
/// Point-in-time view of cache performance, serialized as-is on the
/// stats and health endpoints.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Hits over all lookups as a percentage, e.g. `"75.0%"`
    pub hit_rate: String,
    /// Hits plus misses across every class
    pub total_requests: u64,
    pub hit_counts: BTreeMap<DataType, u64>,
    pub miss_counts: BTreeMap<DataType, u64>,
    pub eviction_counts: BTreeMap<DataType, u64>,
    /// Entries currently held per class (expired ones included until removed)
    pub cache_sizes: BTreeMap<DataType, usize>,
    /// Keys whose refresh marker is raised
    pub pending_refreshes: usize,
}

impl CacheStats {
    /// Adds one class's figures to the snapshot.
    pub(crate) fn record_class(
        &mut self,
        data_type: DataType,
        counters: &ClassCounters,
        size: usize,
    ) {
        self.hit_counts.insert(data_type, counters.hits());
        self.miss_counts.insert(data_type, counters.misses());
        self.eviction_counts.insert(data_type, counters.evictions());
        self.cache_sizes.insert(data_type, size);
    }

    /// Fills in the totals once every class has been recorded.
    pub(crate) fn finish(mut self) -> Self {
        let hits = self.total_hits();
        self.total_requests = hits + self.total_misses();
        self.hit_rate = format_hit_rate(hits, self.total_requests);
        self
    }

    pub fn total_hits(&self) -> u64 {
        self.hit_counts.values().sum()
    }

    pub fn total_misses(&self) -> u64 {
        self.miss_counts.values().sum()
    }
}

// == Hit Rate ==
/// Formats `hits / total` as a percentage with one decimal.
pub fn format_hit_rate(hits: u64, total: u64) -> String {
    let rate = if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64 * 100.0
    };
    format!("{rate:.1}%")
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_new() {
        let counters = ClassCounters::new();
        assert_eq!(counters.hits(), 0);
        assert_eq!(counters.misses(), 0);
        assert_eq!(counters.evictions(), 0);
    }

    #[test]
    fn test_counters_record_and_reset() {
        let counters = ClassCounters::new();
        counters.record_hit();
        counters.record_hit();
        counters.record_miss();
        counters.record_evictions(3);
        counters.record_evictions(0);

        assert_eq!(counters.hits(), 2);
        assert_eq!(counters.misses(), 1);
        assert_eq!(counters.evictions(), 3);

        counters.reset();
        assert_eq!(counters.hits(), 0);
        assert_eq!(counters.misses(), 0);
        assert_eq!(counters.evictions(), 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(format_hit_rate(0, 0), "0.0%");
    }

    #[test]
    fn test_hit_rate_mixed() {
        assert_eq!(format_hit_rate(3, 4), "75.0%");
        assert_eq!(format_hit_rate(1, 3), "33.3%");
        assert_eq!(format_hit_rate(2, 3), "66.7%");
        assert_eq!(format_hit_rate(5, 5), "100.0%");
    }

    #[test]
    fn test_snapshot_totals() {
        let grades = ClassCounters::new();
        grades.record_hit();
        grades.record_hit();
        grades.record_hit();
        grades.record_miss();
        let courses = ClassCounters::new();

        let mut stats = CacheStats::default();
        stats.record_class(DataType::Grades, &grades, 2);
        stats.record_class(DataType::Courses, &courses, 0);
        let stats = stats.finish();

        assert_eq!(stats.total_requests, 4);
        assert_eq!(stats.hit_rate, "75.0%");
        assert_eq!(stats.hit_counts[&DataType::Grades], 3);
        assert_eq!(stats.cache_sizes[&DataType::Grades], 2);
        assert_eq!(stats.total_hits(), 3);
        assert_eq!(stats.total_misses(), 1);
    }

    #[test]
    fn test_snapshot_serializes_class_names() {
        let mut stats = CacheStats::default();
        stats.record_class(DataType::Grades, &ClassCounters::new(), 0);
        let json = serde_json::to_value(stats.finish()).unwrap();

        assert_eq!(json["hit_rate"], "0.0%");
        assert_eq!(json["hit_counts"]["grades"], 0);
        assert_eq!(json["cache_sizes"]["grades"], 0);
    }
}
