//! Driving Ports (API - Inbound)
//!
//! Every mutating call takes the acting identity explicitly and is applied as
//! one atomic transaction. Reads never fail on a disabled guard.

use crate::domain::{Airline, ApprovalOutcome, Flight, InsurancePolicy, ResponseKey, StatusRequest};
use crate::error::LedgerResult;
use crate::types::INDEXES_PER_ORACLE;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{Address, AirlineState, FlightKey, FlightStatus, Wei};

/// Result of one oracle response
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseOutcome {
    /// Status the oracle reported
    pub status: FlightStatus,
    /// Set when this response finalized the flight
    pub finalized: Option<FlightStatus>,
    /// Policies credited by the finalization
    pub credited: usize,
}

/// Primary flight surety API
///
/// This is the driving port for airlines, passengers, oracles and the UI.
#[async_trait]
pub trait FlightSuretyApi: Send + Sync {
    // =========================================================================
    // OPERATIONAL GUARD
    // =========================================================================

    /// Toggle the guard (owner only). Returns whether the value changed.
    async fn set_operating_status(&self, caller: Address, operational: bool) -> LedgerResult<bool>;

    async fn is_operational(&self) -> bool;

    // =========================================================================
    // AIRLINES
    // =========================================================================

    /// Register `airline`, sponsored by `caller`. Returns the created state.
    async fn register_airline(&self, caller: Address, airline: Address) -> LedgerResult<AirlineState>;

    /// Vote for an Applied airline.
    async fn approve_airline(&self, caller: Address, airline: Address) -> LedgerResult<ApprovalOutcome>;

    /// Pay dues; a Registered airline becomes Funded.
    async fn pay_airline_dues(&self, caller: Address, amount: Wei) -> LedgerResult<()>;

    async fn is_airline(&self, id: Address) -> bool;

    async fn airline_state(&self, id: Address) -> Option<AirlineState>;

    async fn approvals_count(&self, id: Address) -> usize;

    /// Registered-or-Funded airlines.
    async fn number_of_airlines(&self) -> usize;

    async fn airline(&self, id: Address) -> Option<Airline>;

    async fn airlines(&self) -> Vec<Airline>;

    // =========================================================================
    // FLIGHTS
    // =========================================================================

    /// List a flight operated by `caller`.
    async fn register_flight(&self, caller: Address, flight: String, timestamp: u64) -> LedgerResult<FlightKey>;

    async fn flight(&self, position: usize) -> Option<Flight>;

    async fn flights_count(&self) -> usize;

    async fn flight_by_key(&self, key: FlightKey) -> Option<Flight>;

    // =========================================================================
    // INSURANCE
    // =========================================================================

    /// Buy a policy on `key`. `funds_sent` is held in escrow.
    async fn purchase_insurance(
        &self,
        buyer: Address,
        key: FlightKey,
        premium: Wei,
        funds_sent: Wei,
    ) -> LedgerResult<()>;

    /// Claim every credited payout. Returns the amount paid out.
    async fn withdraw(&self, buyer: Address) -> LedgerResult<Wei>;

    async fn policy(&self, owner: Address, key: FlightKey) -> Option<InsurancePolicy>;

    async fn policies_of(&self, owner: Address) -> Vec<InsurancePolicy>;

    async fn payable_balance(&self, owner: Address) -> LedgerResult<Wei>;

    async fn ledger_balance(&self) -> Wei;

    // =========================================================================
    // ORACLES
    // =========================================================================

    /// Pay the fee and receive three indexes.
    async fn register_oracle(&self, caller: Address, fee: Wei) -> LedgerResult<[u8; INDEXES_PER_ORACLE]>;

    async fn oracle_indexes(&self, caller: Address) -> LedgerResult<[u8; INDEXES_PER_ORACLE]>;

    /// Open a status request for `key`. Returns the routed index.
    async fn fetch_flight_status(&self, caller: Address, key: FlightKey) -> LedgerResult<u8>;

    /// Report `status_code` for the request at (`index`, `key`).
    async fn submit_oracle_response(
        &self,
        caller: Address,
        index: u8,
        key: FlightKey,
        status_code: u8,
    ) -> LedgerResult<ResponseOutcome>;

    async fn status_request(&self, key: ResponseKey) -> Option<StatusRequest>;
}
