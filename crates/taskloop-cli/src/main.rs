//! taskloop — runs a demo worker that drains numbered payloads.
//!
//! The poll delay comes from `--poll-delay-ms` or TASKLOOP_POLL_DELAY_MS.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use taskloop_cli::{process_numbered, resolve_config};
use taskloop_infra::{init_telemetry, shutdown_telemetry, TelemetryConfig};
use taskloop_worker::Worker;

#[derive(Parser)]
#[command(name = "taskloop", about = "Run a demo taskloop worker")]
struct Cli {
    /// Idle-cycle sleep in milliseconds (falls back to TASKLOOP_POLL_DELAY_MS, then 20)
    #[arg(long)]
    poll_delay_ms: Option<u64>,
    /// Number of payloads to schedule
    #[arg(long, default_value = "25")]
    payloads: u64,
    /// Fail every K-th payload (0 disables failures)
    #[arg(long, default_value = "0")]
    fail_every: u64,
    /// How long to let the worker run before shutting down
    #[arg(long, default_value = "2000")]
    run_for_ms: u64,
    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut telemetry = TelemetryConfig::new("taskloop");
    telemetry.json = cli.json_logs;
    init_telemetry(&telemetry).map_err(|e| anyhow::anyhow!("Failed to init telemetry: {}", e))?;

    let config = resolve_config("demo", cli.poll_delay_ms).context("Invalid worker config")?;
    let fail_every = cli.fail_every;
    let worker = Arc::new(
        Worker::<u64>::builder("demo")
            .config(config)
            .process_fn(move |payload| process_numbered(*payload, fail_every))
            .build()?,
    );

    let handle = worker.spawn();
    for payload in 1..=cli.payloads {
        worker.schedule_with_done(payload, |worker, payload| {
            tracing::debug!(worker = %worker.name(), payload, "Payload done");
        });
    }
    tracing::info!(scheduled = cli.payloads, "Payloads scheduled");

    tokio::time::sleep(Duration::from_millis(cli.run_for_ms)).await;

    let pending = worker.queue_len();
    handle.shutdown().await?;
    tracing::info!(pending, "Demo worker stopped");

    shutdown_telemetry().await;
    Ok(())
}
