//! Telemetry initialization
//!
//! Installs the global tracing subscriber used by worker hosts.

mod init_basic;

pub use init_basic::{default_filter, init_telemetry, shutdown_telemetry, TelemetryConfig};
