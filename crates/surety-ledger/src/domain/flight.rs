//! Flight registry
//!
//! Flights are keyed by (airline, code, timestamp) and enumerated in
//! insertion order. A status is written at most once, and only with a known
//! (non-Unknown) value.

use crate::error::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use shared_types::{FlightKey, FlightStatus};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub key: FlightKey,
    pub status: FlightStatus,
}

impl Flight {
    pub fn is_finalized(&self) -> bool {
        self.status.is_known()
    }
}

#[derive(Clone, Debug, Default)]
pub struct FlightRegistry {
    flights: Vec<Flight>,
    index: HashMap<FlightKey, usize>,
}

impl FlightRegistry {
    pub fn register(&mut self, key: FlightKey) -> LedgerResult<()> {
        if self.index.contains_key(&key) {
            return Err(LedgerError::AlreadyExists {
                entity: "flight",
                id: key.to_string(),
            });
        }
        self.index.insert(key.clone(), self.flights.len());
        self.flights.push(Flight {
            key,
            status: FlightStatus::Unknown,
        });
        Ok(())
    }

    pub fn get(&self, position: usize) -> Option<&Flight> {
        self.flights.get(position)
    }

    pub fn by_key(&self, key: &FlightKey) -> Option<&Flight> {
        self.index.get(key).and_then(|&i| self.flights.get(i))
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    /// Flight that exists and has not been finalized yet.
    pub fn pending(&self, key: &FlightKey) -> LedgerResult<&Flight> {
        let flight = self
            .by_key(key)
            .ok_or_else(|| LedgerError::flight_not_found(key))?;
        if flight.is_finalized() {
            return Err(LedgerError::InvalidState {
                subject: format!("flight {}", key),
                reason: format!("already finalized as {}", flight.status),
            });
        }
        Ok(flight)
    }

    /// Check that `key` can be finalized with `status`.
    pub fn check_finalize(&self, key: &FlightKey, status: FlightStatus) -> LedgerResult<()> {
        if !status.is_known() {
            return Err(LedgerError::InvalidStatusCode(status.code()));
        }
        self.pending(key)?;
        Ok(())
    }

    /// Write the final status of a flight that passed `check_finalize`.
    pub fn set_status(&mut self, key: &FlightKey, status: FlightStatus) {
        if let Some(flight) = self.index.get(key).and_then(|&i| self.flights.get_mut(i)) {
            flight.status = status;
        }
    }
}
