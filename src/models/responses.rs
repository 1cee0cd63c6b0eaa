//! Response DTOs for the dashboard API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheStats, DataType};

/// Where a payload was served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    MemoryCache,
    Upstream,
}

/// Response body for one data class (`GET /api/canvas/{class}/:user_id`)
#[derive(Debug, Clone, Serialize)]
pub struct DataResponse {
    pub user_id: String,
    pub data_type: DataType,
    pub data: Value,
    /// True when served from the cache
    pub cached: bool,
    pub source: DataOrigin,
    /// True when this request scheduled a background refresh
    pub refresh_scheduled: bool,
    pub response_time_ms: f64,
}

/// Response body for the whole dashboard (`GET /api/canvas/all/:user_id`)
#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub user_id: String,
    pub grades: Value,
    pub courses: Value,
    pub assignments: Value,
    pub response_time_ms: f64,
    pub timestamp: String,
}

/// Response body for `POST /api/canvas/sync/:user_id`
#[derive(Debug, Clone, Serialize)]
pub struct SyncResponse {
    pub message: String,
    pub user_id: String,
    /// Cache entries dropped before the resync
    pub invalidated: usize,
    pub timestamp: String,
}

impl SyncResponse {
    pub fn new(user_id: impl Into<String>, invalidated: usize) -> Self {
        Self {
            message: "Background sync started".to_string(),
            user_id: user_id.into(),
            invalidated,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for `DELETE /api/cache/:user_id`
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub message: String,
    pub user_id: String,
    /// Class name as requested, or `"all"`
    pub data_type: String,
    pub removed: usize,
}

impl InvalidateResponse {
    pub fn new(user_id: impl Into<String>, scope: impl Into<String>, removed: usize) -> Self {
        let user_id = user_id.into();
        Self {
            message: format!("Cache invalidated for user {user_id}"),
            user_id,
            data_type: scope.into(),
            removed,
        }
    }
}

/// Response body for the health endpoints (`GET /` and `GET /health`)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    pub version: String,
    pub cache_performance: CacheStats,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a healthy response carrying the given cache statistics
    pub fn healthy(cache_performance: CacheStats) -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            cache_performance,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_response_serialize() {
        let resp = DataResponse {
            user_id: "u1".to_string(),
            data_type: DataType::Grades,
            data: serde_json::json!([1, 2]),
            cached: true,
            source: DataOrigin::MemoryCache,
            refresh_scheduled: false,
            response_time_ms: 0.4,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["data_type"], "grades");
        assert_eq!(json["source"], "memory_cache");
        assert_eq!(json["data"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_invalidate_response_names_class() {
        let one = InvalidateResponse::new("u1", "courses", 1);
        assert_eq!(one.data_type, "courses");

        let all = InvalidateResponse::new("u1", "all", 3);
        assert_eq!(all.data_type, "all");
        assert!(all.message.contains("u1"));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy(CacheStats::default());
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
        assert!(json.contains("cache_performance"));
    }

    #[test]
    fn test_sync_response_serialize() {
        let resp = SyncResponse::new("u9", 2);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["user_id"], "u9");
        assert_eq!(json["invalidated"], 2);
    }
}
