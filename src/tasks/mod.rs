//! Background Tasks Module
//!
//! Contains work that runs outside the request path.
//!
//! # Tasks
//! - TTL Cleanup: Removes expired cache entries at configured intervals
//! - Refresh: Refetches an owner's data set when the cache signals it is
//!   nearing expiry, or after an explicit sync

mod cleanup;
mod refresh;

pub use cleanup::spawn_cleanup_task;
pub use refresh::{refresh_entry, spawn_refresh};
