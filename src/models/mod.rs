//! Request and Response models for the dashboard API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP query strings and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{FetchQuery, InvalidateQuery};
pub use responses::{
    DashboardResponse, DataOrigin, DataResponse, HealthResponse, InvalidateResponse,
    SyncResponse,
};
