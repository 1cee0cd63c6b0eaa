//! Error types for the dashboard cache backend
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::cache::DataType;

// == Cache Error Enum ==
/// Unified error type for the cache and the HTTP layer around it.
///
/// Cache operations never hand these to their callers: `ScopedCache` logs
/// them at its boundary and degrades to a miss or a `false` result. The
/// HTTP layer converts the remaining ones into JSON error responses.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Data type name the cache was not configured for
    #[error("Unknown data type: {0}")]
    UnknownDataType(String),

    /// A per-class store lock was poisoned by a panicking holder
    #[error("Store lock poisoned for data type {0}")]
    LockPoisoned(DataType),

    /// Store cannot admit an entry (zero capacity)
    #[error("Cache full: {0}")]
    CacheFull(String),

    /// Upstream data source failed
    #[error("Upstream fetch failed: {0}")]
    Upstream(String),

    /// Configuration rejected at start-up
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CacheError {
    /// HTTP status used when this error reaches a handler boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CacheError::UnknownDataType(_) => StatusCode::BAD_REQUEST,
            CacheError::Upstream(_) => StatusCode::BAD_GATEWAY,
            CacheError::CacheFull(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::LockPoisoned(_) | CacheError::InvalidConfig(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the dashboard cache backend.
pub type Result<T> = std::result::Result<T, CacheError>;
