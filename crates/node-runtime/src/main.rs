//! # Tidewire Node Runtime
//!
//! The main entry point for a Tidewire node.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (logging and metrics)
//! 2. Load configuration (file named by `TW_CONFIG`, then `TW_*` overrides)
//! 3. Load trust material and connect to the service directory (fatal on failure)
//! 4. Wire subsystems and start background tasks
//! 5. Run until Ctrl-C, then shut down gracefully

use anyhow::{Context, Result};
use node_runtime::{NodeConfig, NodeRuntime, SubsystemContainer};
use std::path::PathBuf;
use tracing::info;
use tw_telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env())
        .context("Failed to initialize telemetry")?;

    let config_path = std::env::var_os("TW_CONFIG").map(PathBuf::from);
    let config = NodeConfig::load(config_path.as_deref()).context("Invalid configuration")?;

    let container = SubsystemContainer::build(config).await?;
    let mut runtime = NodeRuntime::new(container);
    runtime.start();

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
