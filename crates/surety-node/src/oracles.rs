//! # Oracle Simulator
//!
//! Off-ledger oracle process. Registers a pool of oracles, follows
//! `OracleRequest` events from the start of the journal and answers every
//! request with a random status code from each oracle holding the index.
//!
//! ```text
//! journal ──OracleRequest{index, key}──→ simulator ──→ oracles holding index
//!                                                          │
//!                                        submit_oracle_response(random status)
//! ```
//!
//! Rejected responses are logged and dropped; retrying is up to whoever
//! issues the next `fetch_flight_status`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_bus::{LedgerEvent, Subscription};
use shared_types::{Address, FlightKey, FlightStatus, Wei};
use std::sync::Arc;
use surety_ledger::{FlightSuretyApi, LedgerResult, ResponseOutcome, INDEXES_PER_ORACLE};
use surety_telemetry::{component_span, log_account_event, log_flight_event};
use tokio::sync::watch;
use tracing::{debug, info, Instrument};

/// Deterministic account for the `n`th simulated oracle.
pub fn oracle_address(n: u32) -> Address {
    let mut bytes = [0u8; 20];
    bytes[0] = 0x0a;
    bytes[16..].copy_from_slice(&n.to_be_bytes());
    Address(bytes)
}

/// One registered oracle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulatedOracle {
    pub address: Address,
    pub indexes: [u8; INDEXES_PER_ORACLE],
}

/// Answer returned by one oracle for one request.
#[derive(Debug)]
pub struct OracleAnswer {
    pub oracle: Address,
    pub status: FlightStatus,
    pub result: LedgerResult<ResponseOutcome>,
}

pub struct OracleSimulator<S: FlightSuretyApi> {
    service: Arc<S>,
    oracles: Vec<SimulatedOracle>,
    rng: StdRng,
}

impl<S: FlightSuretyApi> OracleSimulator<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self::with_rng(service, StdRng::from_entropy())
    }

    /// Simulator with a fixed random sequence.
    pub fn seeded(service: Arc<S>, seed: u64) -> Self {
        Self::with_rng(service, StdRng::seed_from_u64(seed))
    }

    fn with_rng(service: Arc<S>, rng: StdRng) -> Self {
        Self {
            service,
            oracles: Vec::new(),
            rng,
        }
    }

    pub fn oracles(&self) -> &[SimulatedOracle] {
        &self.oracles
    }

    /// Register `count` oracles, each paying `fee`.
    pub async fn register_oracles(&mut self, count: u32, fee: Wei) -> LedgerResult<()> {
        for n in 0..count {
            let address = oracle_address(n);
            let indexes = self.service.register_oracle(address, fee).await?;
            log_account_event!(debug, "oracles", "Simulated oracle registered", address, indexes = ?indexes);
            self.oracles.push(SimulatedOracle { address, indexes });
        }
        info!(count, "Oracle pool registered");
        Ok(())
    }

    fn random_status(&mut self) -> FlightStatus {
        let pick = self.rng.gen_range(0..FlightStatus::ALL.len());
        FlightStatus::ALL[pick]
    }

    /// Answer one request from every oracle holding `index`.
    pub async fn answer(&mut self, index: u8, key: &FlightKey) -> Vec<OracleAnswer> {
        let matched: Vec<Address> = self
            .oracles
            .iter()
            .filter(|oracle| oracle.indexes.contains(&index))
            .map(|oracle| oracle.address)
            .collect();

        let mut answers = Vec::with_capacity(matched.len());
        for oracle in matched {
            let status = self.random_status();
            let result = self
                .service
                .submit_oracle_response(oracle, index, key.clone(), status.code())
                .await;
            match &result {
                Ok(outcome) => {
                    debug!(oracle = %oracle, index, flight = %key, %status, "Oracle response accepted");
                    if let Some(final_status) = outcome.finalized {
                        log_flight_event!(info, "oracles", "Oracle quorum reached", key, status = %final_status);
                    }
                }
                Err(err) => {
                    log_flight_event!(warn, "oracles", "Oracle response rejected", key, oracle = %oracle, index, error = %err);
                }
            }
            answers.push(OracleAnswer {
                oracle,
                status,
                result,
            });
        }
        answers
    }

    /// Follow `subscription` until it closes or `shutdown` flips.
    pub async fn run(mut self, mut subscription: Subscription, mut shutdown: watch::Receiver<bool>) {
        info!(cursor = subscription.cursor(), oracles = self.oracles.len(), "Oracle simulator started");
        loop {
            let entry = tokio::select! {
                entry = subscription.recv() => entry,
                _ = shutdown.changed() => {
                    info!("Oracle simulator shutdown signal received");
                    return;
                }
            };
            let Some(entry) = entry else {
                info!("Event bus closed, oracle simulator stopping");
                return;
            };
            if let LedgerEvent::OracleRequest { index, key, .. } = entry.event {
                let span = component_span!("oracle_round", component = "oracles", index, sequence = entry.sequence);
                self.answer(index, &key).instrument(span).await;
            }
        }
    }
}
