//! Request DTOs for the dashboard API
//!
//! Defines the query strings accepted by the endpoints.

use serde::Deserialize;

/// Query for the cached data endpoints (`GET /api/canvas/{class}/:user_id`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FetchQuery {
    /// Skip the cache and refetch from upstream
    #[serde(default)]
    pub force_refresh: bool,
}

/// Query for cache invalidation (`DELETE /api/cache/:user_id`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvalidateQuery {
    /// Class to invalidate; every class when omitted
    #[serde(default)]
    pub data_type: Option<String>,
}

impl InvalidateQuery {
    /// Label echoed back in the response: the requested class name as
    /// given, or `"all"`.
    pub fn scope(&self) -> &str {
        self.data_type.as_deref().unwrap_or("all")
    }
}
