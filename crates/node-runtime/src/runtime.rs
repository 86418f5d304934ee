//! # Node Runtime
//!
//! Starts the background tasks around a built container and stops them on
//! shutdown.

use crate::container::SubsystemContainer;
use crate::handlers::IngestHandler;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tw_03_link_store::spawn_cleanup_task;
use tw_telemetry::encode_metrics;

/// How long shutdown waits for each task.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// The node runtime orchestrating all subsystems.
pub struct NodeRuntime {
    container: Arc<SubsystemContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl NodeRuntime {
    pub fn new(container: SubsystemContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            shutdown_tx,
            shutdown_rx,
            tasks: Vec::new(),
        }
    }

    /// Spawn the ingest handler and the link cleanup sweep.
    pub fn start(&mut self) {
        info!("===========================================");
        info!("  Tidewire Node Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("  Node: {}", self.container.config.node.mrn);
        info!("===========================================");

        let handler = IngestHandler::new(
            self.container.api.clone(),
            self.container.event_bus.as_ref(),
        );
        let mut handler_shutdown = self.shutdown_rx.clone();
        let ingest = tokio::spawn(async move {
            tokio::select! {
                _ = handler.run() => {}
                _ = handler_shutdown.changed() => {
                    info!("[node-runtime] Ingest handler shutdown signal received");
                }
            }
        });
        self.tasks.push(("ingest", ingest));

        let cleanup = spawn_cleanup_task(
            self.container.links.clone(),
            self.container.time_source.clone(),
            self.container.config.links.cleanup_interval(),
            self.shutdown_rx.clone(),
        );
        self.tasks.push(("link-cleanup", cleanup));

        info!(
            directory = %self.container.config.directory.url,
            algorithm = %self.container.config.trust.signature_algorithm,
            "Node running"
        );
    }

    /// Signal every task to stop and wait for them.
    pub async fn shutdown(self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        for (name, task) in self.tasks {
            match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(task = name, error = %e, "Task ended abnormally"),
                Err(_) => warn!(task = name, "Task did not stop in time"),
            }
        }

        match metrics_snapshot() {
            Ok(text) => info!(target: "tw::metrics", "Final metrics\n{text}"),
            Err(e) => warn!(error = %e, "Could not encode final metrics"),
        }

        info!("Shutdown complete");
    }

    pub fn container(&self) -> Arc<SubsystemContainer> {
        Arc::clone(&self.container)
    }
}

/// Current metrics in Prometheus text format.
pub fn metrics_snapshot() -> Result<String, tw_telemetry::TelemetryError> {
    encode_metrics()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::NodeConfig;
    use async_trait::async_trait;
    use shared_types::SystemTimeSource;
    use tw_04_trust_provider::test_utils::TrustFixture;
    use tw_05_service_locator::{EndpointResolver, LocatorError, RemoteNodeClient};

    struct NoDirectory;

    #[async_trait]
    impl EndpointResolver for NoDirectory {
        async fn resolve_mrn(
            &self,
            mrn: &shared_types::Mrn,
        ) -> Result<Arc<dyn RemoteNodeClient>, LocatorError> {
            Err(LocatorError::NotRegistered(mrn.to_string()))
        }
    }

    #[tokio::test]
    async fn test_start_then_shutdown_stops_tasks() {
        let mut config = NodeConfig::default();
        config.node.mrn = "urn:mrn:mcp:service:dk:dma:tidewire".into();
        let container = SubsystemContainer::assemble(
            config,
            Arc::new(TrustFixture::generate().provider()),
            Arc::new(NoDirectory),
            Arc::new(SystemTimeSource),
        )
        .unwrap();

        let mut runtime = NodeRuntime::new(container);
        runtime.start();
        assert_eq!(runtime.tasks.len(), 2);

        tokio::time::timeout(Duration::from_secs(10), runtime.shutdown())
            .await
            .unwrap();
    }

    #[test]
    fn test_metrics_snapshot_lists_node_counters() {
        // Another test in this binary may have registered already.
        let _ = tw_telemetry::register_metrics();
        tw_telemetry::LINKS_PURGED.inc_by(0.0);

        let text = metrics_snapshot().unwrap();
        assert!(text.contains("tw_links_purged_total"));
        assert!(text.contains("tw_bus_events_lagged_total"));
    }
}
