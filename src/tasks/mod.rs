//! Background Tasks Module
//!
//! - TTL Cleanup: removes expired cache entries at a fixed interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;
