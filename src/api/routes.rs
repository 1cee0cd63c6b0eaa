//! API Routes
//!
//! Configures the Axum router with all dashboard endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    assignments_handler, courses_handler, dashboard_handler, grades_handler, health_handler,
    invalidate_handler, stats_handler, sync_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` and `GET /health` - Health check with cache performance
/// - `GET /api/canvas/grades/:user_id` - Grades for a user
/// - `GET /api/canvas/courses/:user_id` - Courses for a user
/// - `GET /api/canvas/assignments/:user_id` - Assignments for a user
/// - `GET /api/canvas/all/:user_id` - All dashboard data at once
/// - `POST /api/canvas/sync/:user_id` - Invalidate and refetch in the background
/// - `GET /api/cache/stats` - Cache statistics
/// - `DELETE /api/cache/:user_id` - Invalidate a user's cached data
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health_handler))
        .route("/health", get(health_handler))
        .route("/api/canvas/grades/:user_id", get(grades_handler))
        .route("/api/canvas/courses/:user_id", get(courses_handler))
        .route("/api/canvas/assignments/:user_id", get(assignments_handler))
        .route("/api/canvas/all/:user_id", get(dashboard_handler))
        .route("/api/canvas/sync/:user_id", post(sync_handler))
        .route("/api/cache/stats", get(stats_handler))
        .route("/api/cache/:user_id", delete(invalidate_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
