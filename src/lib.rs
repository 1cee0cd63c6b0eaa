//! Dashboard Cache - per-user TTL cache in front of a slow dashboard backend
//!
//! Caches grades, courses, assignments and tokens per user with per-class
//! capacity, TTL, LRU eviction, hit/miss statistics and near-expiry refresh.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod source;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cache::{CacheConfig, ClassConfig, DataType, ScopedCache};
pub use config::Config;
pub use error::CacheError;
pub use source::{DataSource, SampleDataSource};
pub use tasks::spawn_cleanup_task;
