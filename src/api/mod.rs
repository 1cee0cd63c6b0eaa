//! API Module
//!
//! HTTP handlers and routing for the dashboard REST API.
//!
//! # Endpoints
//! - `GET /api/canvas/{grades|courses|assignments}/:user_id` - Cached data reads
//! - `GET /api/canvas/all/:user_id` - Every dashboard class at once
//! - `POST /api/canvas/sync/:user_id` - Force a background resync
//! - `GET /api/cache/stats` - Cache statistics
//! - `DELETE /api/cache/:user_id` - Invalidate cached data
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
