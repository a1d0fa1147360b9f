//! Taskloop Core Library
//!
//! This crate provides the configuration values, shared constants and error types
//! used by taskloop workers and their hosts.

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{
    PollDelay, WorkerConfig, DEFAULT_POLL_DELAY_MS, QUEUE_DEBOUNCE_THRESHOLD, QUEUE_ITEMS_DELAY,
};
pub use error::{ConfigError, ProcessError, WorkerError};
