//! Ledger state
//!
//! The single store every transaction mutates in place. Operations finish
//! their checks before the first write, so a failed call leaves no trace,
//! including the entropy nonce.

use crate::domain::{
    AirlineRegistry, FlightRegistry, OperationalGuard, Oracle, PolicyBook, ResponseKey,
    StatusRequest,
};
use shared_types::{Address, Wei};
use std::collections::HashMap;

#[derive(Debug)]
pub struct LedgerState {
    pub guard: OperationalGuard,
    pub airlines: AirlineRegistry,
    pub flights: FlightRegistry,
    pub policies: PolicyBook,
    pub oracles: HashMap<Address, Oracle>,
    pub requests: HashMap<ResponseKey, StatusRequest>,
    /// Dues, escrowed premiums and oracle fees, minus withdrawals
    pub balance: Wei,
    /// Per-call entropy nonce
    pub nonce: u64,
}

impl LedgerState {
    /// Fresh ledger: operational, with `first_airline` Registered.
    pub fn genesis(owner: Address, first_airline: Address) -> Self {
        Self {
            guard: OperationalGuard::new(owner),
            airlines: AirlineRegistry::with_genesis(first_airline),
            flights: FlightRegistry::default(),
            policies: PolicyBook::default(),
            oracles: HashMap::new(),
            requests: HashMap::new(),
            balance: 0,
            nonce: 0,
        }
    }

    /// Consume the current nonce and advance it.
    pub fn next_nonce(&mut self) -> u64 {
        let nonce = self.nonce;
        self.nonce = self.nonce.wrapping_add(1);
        nonce
    }
}
