//! # Node Runtime
//!
//! Wires the ledger service to the event bus and runs the oracle simulator.
//!
//! ## Startup Sequence
//!
//! 1. Create the event bus and the genesis ledger
//! 2. Register the simulated oracle pool
//! 3. Subscribe the simulator to `OracleRequest` from the start of the journal
//! 4. Spawn the simulator task

use crate::config::NodeConfig;
use crate::oracles::OracleSimulator;
use anyhow::{Context, Result};
use shared_bus::{EventFilter, EventTopic, InMemoryEventBus};
use std::sync::Arc;
use surety_ledger::adapters::KeccakEntropy;
use surety_ledger::{FlightSuretyService, Ledger};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use surety_telemetry::log_event;
use tracing::{error, info};

/// Service type run by the node.
pub type NodeService = FlightSuretyService<KeccakEntropy, InMemoryEventBus>;

pub struct NodeRuntime {
    config: NodeConfig,
    bus: Arc<InMemoryEventBus>,
    service: Arc<NodeService>,
    simulator: Mutex<Option<JoinHandle<()>>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl NodeRuntime {
    pub fn new(config: NodeConfig) -> Self {
        info!(owner = %config.owner, first_airline = %config.first_airline, "Creating flight surety node");

        let bus = Arc::new(InMemoryEventBus::new());
        let ledger = Ledger::genesis(config.ledger.clone(), config.owner, config.first_airline);
        let service = Arc::new(FlightSuretyService::new(ledger, bus.clone()));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            config,
            bus,
            service,
            simulator: Mutex::new(None),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Register oracles and start answering status requests.
    pub async fn start(&self) -> Result<()> {
        if self.config.oracle_count == 0 {
            info!("Oracle simulator disabled");
            return Ok(());
        }

        let mut simulator = OracleSimulator::new(self.service.clone());
        simulator
            .register_oracles(self.config.oracle_count, self.config.ledger.oracle_fee)
            .await
            .context("Failed to register simulated oracles")?;

        // From sequence 0 so requests made before startup are still answered
        let subscription = self
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Oracles]));
        let shutdown = self.shutdown_rx.clone();
        let handle = tokio::spawn(simulator.run(subscription, shutdown));
        *self.simulator.lock().await = Some(handle);

        log_event!(info, "runtime", "Flight surety node running", oracles = self.config.oracle_count);
        Ok(())
    }

    /// Stop the simulator and wait for it to exit.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
        if let Some(handle) = self.simulator.lock().await.take() {
            if let Err(e) = handle.await {
                error!("Oracle simulator task failed: {}", e);
            }
        }

        info!(events = self.bus.head(), "Shutdown complete");
    }

    pub fn service(&self) -> Arc<NodeService> {
        Arc::clone(&self.service)
    }

    pub fn bus(&self) -> Arc<InMemoryEventBus> {
        Arc::clone(&self.bus)
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }
}
