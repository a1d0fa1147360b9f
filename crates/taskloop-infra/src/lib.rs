//! Taskloop Infrastructure Library
//!
//! Shared infrastructure for hosts that run taskloop workers:
//! - Telemetry initialization (tracing subscriber)

#[cfg(feature = "observability-basic")]
pub mod telemetry;

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry, TelemetryConfig};
