//! Data Type Module
//!
//! Closed set of cached data classes and their per-class limits.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

// == Data Type ==
/// Category of cached payload. Each variant owns an independent store
/// with its own capacity and TTL.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Grades,
    Courses,
    Assignments,
    Tokens,
}

impl DataType {
    /// Number of data classes.
    pub const COUNT: usize = 4;

    /// Every data class, in store order.
    pub const ALL: [DataType; Self::COUNT] = [
        DataType::Grades,
        DataType::Courses,
        DataType::Assignments,
        DataType::Tokens,
    ];

    /// Classes served to the dashboard from the upstream source.
    pub const DASHBOARD: [DataType; 3] =
        [DataType::Grades, DataType::Courses, DataType::Assignments];

    /// Lowercase name used in keys, logs and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Grades => "grades",
            DataType::Courses => "courses",
            DataType::Assignments => "assignments",
            DataType::Tokens => "tokens",
        }
    }

    /// Position of this class's store.
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Prefix for this class's environment variables.
    pub(crate) fn env_prefix(self) -> &'static str {
        match self {
            DataType::Grades => "GRADES",
            DataType::Courses => "COURSES",
            DataType::Assignments => "ASSIGNMENTS",
            DataType::Tokens => "TOKENS",
        }
    }

    /// Built-in limits for this class.
    pub fn default_config(self) -> ClassConfig {
        match self {
            DataType::Grades => ClassConfig::new(1000, Duration::from_secs(300)),
            DataType::Courses => ClassConfig::new(500, Duration::from_secs(1800)),
            DataType::Assignments => ClassConfig::new(2000, Duration::from_secs(900)),
            DataType::Tokens => ClassConfig::new(100, Duration::from_secs(3600)),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .into_iter()
            .find(|dt| dt.as_str() == s)
            .ok_or_else(|| CacheError::UnknownDataType(s.to_string()))
    }
}

// == Class Config ==
/// Longest TTL a class may be configured with (30 days).
pub const MAX_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Capacity and TTL bound to one data class at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassConfig {
    /// Maximum number of live entries
    pub max_size: usize,
    /// Maximum age before an entry reads as absent
    pub ttl: Duration,
}

impl ClassConfig {
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self { max_size, ttl }
    }

    /// Age past which a fresh entry should be refreshed (80% of TTL).
    ///
    /// Never overflows: TTLs too large to scale exactly are divided first.
    pub fn refresh_threshold(&self) -> Duration {
        let percent = super::REFRESH_THRESHOLD_PERCENT;
        self.ttl
            .checked_mul(percent)
            .map_or_else(|| self.ttl / 100 * percent, |scaled| scaled / 100)
    }
}

// == Cache Config ==
/// One `ClassConfig` per data class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    classes: [ClassConfig; DataType::COUNT],
}

impl CacheConfig {
    /// Returns the limits for `data_type`.
    pub fn class(&self, data_type: DataType) -> ClassConfig {
        self.classes[data_type.index()]
    }

    /// Replaces the limits for `data_type`.
    pub fn with_class(mut self, data_type: DataType, config: ClassConfig) -> Self {
        self.classes[data_type.index()] = config;
        self
    }

    /// Rejects classes that could never hold an entry, and TTLs beyond
    /// [`MAX_TTL`].
    pub fn validate(&self) -> crate::error::Result<()> {
        for data_type in DataType::ALL {
            let class = self.class(data_type);
            if class.max_size == 0 {
                return Err(CacheError::InvalidConfig(format!(
                    "{data_type} max size must be greater than zero"
                )));
            }
            if class.ttl.is_zero() {
                return Err(CacheError::InvalidConfig(format!(
                    "{data_type} TTL must be greater than zero"
                )));
            }
            if class.ttl > MAX_TTL {
                return Err(CacheError::InvalidConfig(format!(
                    "{data_type} TTL must be at most {} seconds",
                    MAX_TTL.as_secs()
                )));
            }
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            classes: DataType::ALL.map(DataType::default_config),
        }
    }
}
