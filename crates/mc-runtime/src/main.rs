//! # Message Center Demo
//!
//! Runs the two-round demonstration from [`mc_runtime`] against a timed
//! dispatch driver, pausing twice the dispatch interval after each round so
//! the driver gets to deliver.

use anyhow::{Context, Result};
use mc_runtime::{load_driver_config, DemoRuntime};
use mc_telemetry::{init_logging, TelemetryConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::for_service("mc-runtime");
    init_logging(&telemetry).context("Failed to initialize logging")?;

    let config = load_driver_config()?;
    let pause = config.dispatch_interval() * 2;

    info!("Start test...");
    let runtime = DemoRuntime::start(config, &telemetry)?;

    runtime.send_first_round();
    info!(pause_ms = pause.as_millis() as u64, "Sleeping");
    tokio::time::sleep(pause).await;

    runtime.send_second_round();
    info!(pause_ms = pause.as_millis() as u64, "Sleeping");
    tokio::time::sleep(pause).await;

    let deliveries = runtime.deliveries();
    info!(deliveries = deliveries.len(), "End test...");
    runtime.shutdown();
    Ok(())
}
