//! Oracle coordination
//!
//! Each status request is identified by its correlation key
//! (index, airline, flight, timestamp):
//!
//! ```text
//! fetch_flight_status ──→ [Open] ──quorum of one known status──→ [Finalized(status)]
//!                           │                                          │
//!                           └── responses tallied per status ──────────┴── late responses
//!                                                                          recorded only
//! ```
//!
//! Quorum is per value: the first status whose tally reaches the minimum
//! wins, even if another status later collects more responses.

use crate::error::{LedgerError, LedgerResult};
use crate::types::INDEXES_PER_ORACLE;
use serde::{Deserialize, Serialize};
use shared_types::{Address, FlightKey, FlightStatus, Wei};
use std::collections::BTreeMap;
use std::fmt;

/// A registered oracle and its immutable index assignment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Oracle {
    pub id: Address,
    pub indexes: [u8; INDEXES_PER_ORACLE],
    pub fee_paid: Wei,
}

impl Oracle {
    pub fn holds(&self, index: u8) -> bool {
        self.indexes.contains(&index)
    }
}

/// Correlation key of one status request.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResponseKey {
    pub index: u8,
    pub flight: FlightKey,
}

impl ResponseKey {
    pub fn new(index: u8, flight: FlightKey) -> Self {
        Self { index, flight }
    }
}

impl fmt::Display for ResponseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}", self.index, self.flight)
    }
}

impl fmt::Debug for ResponseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResponseKey({})", self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestState {
    Open,
    Finalized(FlightStatus),
}

/// One status request and every response it received.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRequest {
    pub key: ResponseKey,
    pub requester: Address,
    pub state: RequestState,
    /// Oracle -> reported status, one entry per oracle
    pub responses: BTreeMap<Address, FlightStatus>,
    /// Per-status response counts
    pub tallies: BTreeMap<FlightStatus, usize>,
}

impl StatusRequest {
    pub fn open(key: ResponseKey, requester: Address) -> Self {
        Self {
            key,
            requester,
            state: RequestState::Open,
            responses: BTreeMap::new(),
            tallies: BTreeMap::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == RequestState::Open
    }

    /// Mark the request finalized by a sibling request on the same flight.
    pub fn close(&mut self, status: FlightStatus) {
        if self.is_open() {
            self.state = RequestState::Finalized(status);
        }
    }

    pub fn tally(&self, status: FlightStatus) -> usize {
        self.tallies.get(&status).copied().unwrap_or(0)
    }

    /// Check a response without recording it. Returns whether recording it
    /// would finalize the request.
    pub fn admit(&self, oracle: &Address, status: FlightStatus, quorum: usize) -> LedgerResult<bool> {
        if self.responses.contains_key(oracle) {
            return Err(LedgerError::DuplicateResponse {
                oracle: *oracle,
                index: self.key.index,
                flight: self.key.flight.clone(),
            });
        }
        Ok(self.is_open() && status.is_known() && self.tally(status) + 1 >= quorum)
    }

    /// Record a response. Returns the status this response finalized, if any.
    ///
    /// After finalization responses are still recorded but change nothing.
    pub fn record(
        &mut self,
        oracle: Address,
        status: FlightStatus,
        quorum: usize,
    ) -> LedgerResult<Option<FlightStatus>> {
        let finalizes = self.admit(&oracle, status, quorum)?;
        self.responses.insert(oracle, status);
        *self.tallies.entry(status).or_insert(0) += 1;

        if finalizes {
            self.state = RequestState::Finalized(status);
            return Ok(Some(status));
        }
        Ok(None)
    }
}
