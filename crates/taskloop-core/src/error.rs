//! Error types module
//!
//! `ConfigError` covers invalid configuration values, `WorkerError` covers worker
//! construction and lifecycle failures, and `ProcessError` is what a worker hands
//! to the fail callback when processing a payload panics.

use std::any::Any;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Worker {worker} does not have a poll delay configured")]
    MissingPollDelay { worker: String },

    #[error("Worker {worker} does not have a processor")]
    MissingProcessor { worker: String },

    #[error("Worker panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Processing panicked: {message}")]
    Panicked { message: String },
}

impl ProcessError {
    /// Build a `Panicked` error from a caught panic payload.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::Panicked { message }
    }
}
