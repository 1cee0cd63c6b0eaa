//! API Handlers
//!
//! HTTP request handlers for each dashboard endpoint. Data endpoints read
//! through the cache: a hit is served from memory, a miss is fetched from
//! the upstream source and cached.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;
use tracing::{error, info};

use crate::cache::{CacheStats, DataType, ScopedCache};
use crate::config::Config;
use crate::error::Result;
use crate::models::{
    DashboardResponse, DataOrigin, DataResponse, FetchQuery, HealthResponse, InvalidateQuery,
    InvalidateResponse, SyncResponse,
};
use crate::source::{DataSource, SampleDataSource};
use crate::tasks::spawn_refresh;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared per-user cache
    pub cache: Arc<ScopedCache>,
    /// Where cache misses are fetched from
    pub source: Arc<dyn DataSource>,
}

impl AppState {
    /// Creates a new AppState around the given cache and data source.
    pub fn new(cache: ScopedCache, source: impl DataSource + 'static) -> Self {
        Self {
            cache: Arc::new(cache),
            source: Arc::new(source),
        }
    }

    /// Creates a new AppState from configuration, backed by the sample
    /// data source.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ScopedCache::new(&config.cache),
            SampleDataSource::new(config.fetch_latency),
        )
    }
}

/// A payload and how it was obtained.
struct Served {
    data: Value,
    origin: DataOrigin,
    refresh_scheduled: bool,
}

/// Reads one data class through the cache.
///
/// A hit that raised the refresh marker schedules a background refetch; the
/// stale payload is still returned right away.
async fn read_through(
    state: &AppState,
    user_id: &str,
    data_type: DataType,
    force_refresh: bool,
) -> Result<Served> {
    if !force_refresh {
        if let Some(hit) = state.cache.get(user_id, data_type) {
            if hit.refresh_requested {
                spawn_refresh(
                    Arc::clone(&state.cache),
                    Arc::clone(&state.source),
                    user_id.to_string(),
                    data_type,
                );
            }
            return Ok(Served {
                data: (*hit.value).clone(),
                origin: DataOrigin::MemoryCache,
                refresh_scheduled: hit.refresh_requested,
            });
        }
    }

    let data = state
        .source
        .fetch(user_id, data_type)
        .await
        .inspect_err(|err| error!(user_id, %data_type, error = %err, "Upstream fetch failed"))?;
    state.cache.set(user_id, data_type, data.clone());

    Ok(Served {
        data,
        origin: DataOrigin::Upstream,
        refresh_scheduled: false,
    })
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

async fn data_response(
    state: AppState,
    user_id: String,
    data_type: DataType,
    query: FetchQuery,
) -> Result<Json<DataResponse>> {
    let started = Instant::now();
    let served = read_through(&state, &user_id, data_type, query.force_refresh).await?;
    let response_time_ms = elapsed_ms(started);

    info!(
        user_id = %user_id,
        %data_type,
        source = ?served.origin,
        response_time_ms,
        "Served dashboard data"
    );

    Ok(Json(DataResponse {
        user_id,
        data_type,
        data: served.data,
        cached: served.origin == DataOrigin::MemoryCache,
        source: served.origin,
        refresh_scheduled: served.refresh_scheduled,
        response_time_ms,
    }))
}

/// Handler for GET /api/canvas/grades/:user_id
pub async fn grades_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<FetchQuery>,
) -> Result<Json<DataResponse>> {
    data_response(state, user_id, DataType::Grades, query).await
}

/// Handler for GET /api/canvas/courses/:user_id
pub async fn courses_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<FetchQuery>,
) -> Result<Json<DataResponse>> {
    data_response(state, user_id, DataType::Courses, query).await
}

/// Handler for GET /api/canvas/assignments/:user_id
pub async fn assignments_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<FetchQuery>,
) -> Result<Json<DataResponse>> {
    data_response(state, user_id, DataType::Assignments, query).await
}

/// Handler for GET /api/canvas/all/:user_id
///
/// Reads the three dashboard classes concurrently.
pub async fn dashboard_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<DashboardResponse>> {
    let started = Instant::now();

    let (grades, courses, assignments) = tokio::try_join!(
        read_through(&state, &user_id, DataType::Grades, false),
        read_through(&state, &user_id, DataType::Courses, false),
        read_through(&state, &user_id, DataType::Assignments, false),
    )?;

    let response_time_ms = elapsed_ms(started);
    info!(user_id = %user_id, response_time_ms, "Served full dashboard");

    Ok(Json(DashboardResponse {
        user_id,
        grades: grades.data,
        courses: courses.data,
        assignments: assignments.data,
        response_time_ms,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

/// Handler for POST /api/canvas/sync/:user_id
///
/// Drops everything cached for the user and refetches the dashboard classes
/// in the background.
pub async fn sync_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<SyncResponse> {
    let invalidated = state.cache.invalidate(&user_id, None);

    for data_type in DataType::DASHBOARD {
        spawn_refresh(
            Arc::clone(&state.cache),
            Arc::clone(&state.source),
            user_id.clone(),
            data_type,
        );
    }

    info!(user_id = %user_id, invalidated, "Background sync started");
    Json(SyncResponse::new(user_id, invalidated))
}

/// Handler for GET /api/cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

/// Handler for DELETE /api/cache/:user_id
///
/// Invalidates one class when `data_type` is given, otherwise every class.
/// An unknown class name removes nothing.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<InvalidateQuery>,
) -> Json<InvalidateResponse> {
    let removed = match query.data_type.as_deref() {
        Some(name) => state.cache.invalidate_by_name(&user_id, name),
        None => state.cache.invalidate(&user_id, None),
    };

    Json(InvalidateResponse::new(user_id, query.scope(), removed))
}

/// Handler for GET / and GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.cache.stats()))
}
