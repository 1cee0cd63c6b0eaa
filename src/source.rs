//! Upstream Data Source
//!
//! Abstraction over the service the dashboard data is fetched from on a
//! cache miss, plus a fixed-data implementation used by default.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::cache::DataType;
use crate::error::{CacheError, Result};

// == Data Source ==
/// Fetches one owner's data set of a given class from upstream.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self, user_id: &str, data_type: DataType) -> Result<Value>;
}

// == Sample Data Source ==
/// Returns fixed grades, courses and assignments after a simulated
/// upstream latency.
#[derive(Debug, Clone, Default)]
pub struct SampleDataSource {
    latency: Duration,
}

impl SampleDataSource {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl DataSource for SampleDataSource {
    async fn fetch(&self, user_id: &str, data_type: DataType) -> Result<Value> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        debug!(user_id, %data_type, "Fetched sample data");

        match data_type {
            DataType::Grades => Ok(json!([
                {"id": 1, "score": 95, "assignment": "Quiz 1", "course": "Math 101"},
                {"id": 2, "score": 87, "assignment": "Essay", "course": "English 102"}
            ])),
            DataType::Courses => Ok(json!([
                {"id": 1, "name": "Math 101", "code": "MATH101"},
                {"id": 2, "name": "English 102", "code": "ENG102"}
            ])),
            DataType::Assignments => Ok(json!([
                {"id": 1, "name": "Quiz 2", "due_date": "2024-12-20", "course_id": 1},
                {"id": 2, "name": "Final Essay", "due_date": "2024-12-22", "course_id": 2}
            ])),
            DataType::Tokens => Err(CacheError::Upstream(
                "tokens are not served by the upstream source".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sample_source_serves_dashboard_classes() {
        let source = SampleDataSource::default();

        for data_type in DataType::DASHBOARD {
            let data = source.fetch("u1", data_type).await.unwrap();
            assert_eq!(data.as_array().map(Vec::len), Some(2));
        }
    }

    #[tokio::test]
    async fn test_sample_source_rejects_tokens() {
        let source = SampleDataSource::default();

        let result = source.fetch("u1", DataType::Tokens).await;
        assert!(matches!(result, Err(CacheError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_sample_source_latency() {
        let source = SampleDataSource::new(Duration::from_millis(50));

        let started = std::time::Instant::now();
        source.fetch("u1", DataType::Courses).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(50));
    }
}
