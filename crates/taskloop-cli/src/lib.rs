//! Helpers for the `taskloop` demo binary.

use anyhow::bail;
use taskloop_core::{PollDelay, WorkerConfig};

/// Environment prefix for the demo worker (`TASKLOOP_POLL_DELAY_MS`).
pub const ENV_PREFIX: &str = "TASKLOOP";

/// Demo processing step: rejects every `fail_every`-th payload (0 disables failures).
pub fn process_numbered(payload: u64, fail_every: u64) -> anyhow::Result<()> {
    if fail_every > 0 && payload % fail_every == 0 {
        bail!("payload {} rejected (every {}th payload fails)", payload, fail_every);
    }
    tracing::info!(payload, "Payload processed");
    Ok(())
}

/// Resolve the worker config, preferring an explicit flag over the environment.
pub fn resolve_config(name: &str, poll_delay_ms: Option<u64>) -> anyhow::Result<WorkerConfig> {
    match poll_delay_ms {
        Some(ms) => Ok(WorkerConfig::new(name).with_poll_delay(PollDelay::from_millis(ms))),
        None => Ok(WorkerConfig::from_env(name, ENV_PREFIX)?),
    }
}
