//! Configuration module
//!
//! Worker configuration and the queue constants shared by every worker instance.
//! A worker must carry a [`PollDelay`] before its loop will process anything.

use std::env;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Poll delay applied when a worker type does not specify one explicitly.
pub const DEFAULT_POLL_DELAY_MS: u64 = 20;

/// Queue depth below which the drain loop pauses between items.
pub const QUEUE_DEBOUNCE_THRESHOLD: usize = 10;

/// Pause inserted between items while the queue is below [`QUEUE_DEBOUNCE_THRESHOLD`].
pub const QUEUE_ITEMS_DELAY: Duration = Duration::from_millis(20);

/// Idle-cycle sleep applied once a worker's queue is fully drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PollDelay(u64);

impl PollDelay {
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    pub const fn as_duration(&self) -> Duration {
        Duration::from_millis(self.0)
    }
}

impl Default for PollDelay {
    fn default() -> Self {
        Self(DEFAULT_POLL_DELAY_MS)
    }
}

impl fmt::Display for PollDelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Per-worker configuration.
///
/// `poll_delay` is optional so that hosts can build a config incrementally; the
/// worker builder rejects a config that still lacks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    pub name: String,
    #[serde(default)]
    pub poll_delay: Option<PollDelay>,
}

impl WorkerConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            poll_delay: None,
        }
    }

    pub fn with_poll_delay(mut self, poll_delay: PollDelay) -> Self {
        self.poll_delay = Some(poll_delay);
        self
    }

    /// Load a worker config from the process environment.
    ///
    /// Reads `<PREFIX>_POLL_DELAY_MS`; when unset the default poll delay applies.
    /// A `.env` file is loaded first if present.
    pub fn from_env(name: impl Into<String>, prefix: &str) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(name, prefix, |key| env::var(key).ok())
    }

    /// Same as [`WorkerConfig::from_env`] but reads values through `lookup`.
    pub fn from_lookup<F>(name: impl Into<String>, prefix: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = format!("{}_POLL_DELAY_MS", prefix.trim_end_matches('_'));
        let poll_delay = match lookup(&key) {
            Some(raw) => parse_poll_delay(&key, &raw)?,
            None => PollDelay::default(),
        };

        let config = Self::new(name).with_poll_delay(poll_delay);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "name".to_string(),
                value: self.name.clone(),
                reason: "worker name must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_poll_delay(key: &str, raw: &str) -> Result<PollDelay, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(PollDelay::from_millis)
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            reason: format!("expected a non-negative number of milliseconds: {}", e),
        })
}
