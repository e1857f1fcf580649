//! # Flight Surety Node
//!
//! Starts the ledger with an in-process oracle pool and runs until Ctrl+C.

use anyhow::{Context, Result};
use surety_node::{NodeConfig, NodeRuntime};
use surety_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env())
        .context("Failed to initialize telemetry")?;

    let config = NodeConfig::from_env().context("Invalid node configuration")?;

    let runtime = NodeRuntime::new(config);
    runtime.start().await?;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;

    Ok(())
}
