//! # surety-ledger
//!
//! Flight insurance underwriting ledger.
//!
//! ## Overview
//!
//! This crate provides:
//! - **Airline onboarding**: bootstrap quota, then `ceil(n/2)` consensus among
//!   Registered-or-Funded airlines, then funding
//! - **Insurance**: capped premiums held in escrow, 1.5x payout on
//!   airline-caused delays, pull-based withdrawal
//! - **Oracle quorum**: three matching reports finalize a flight status
//!
//! ## Architecture
//!
//! ```text
//! Airlines / Passengers / Oracles
//!              │
//!              ▼
//!   FlightSuretyApi (async) ──→ FlightSuretyService ──→ Ledger (check, then write)
//!                                        │                    │
//!                                        │                    └── EntropySource (seeded)
//!                                        ▼
//!                               EventPublisher ──→ shared-bus journal ──→ oracle process / UI
//! ```
//!
//! ## Atomicity
//!
//! Every mutation checks all of its preconditions against [`LedgerState`]
//! before its first write. Failures leave no state, nonce or event behind,
//! and no transaction copies the state.
//!
//! ## Example
//!
//! ```rust,ignore
//! use surety_ledger::{FlightSuretyService, Ledger, LedgerConfig};
//! use surety_ledger::ports::inbound::FlightSuretyApi;
//!
//! let ledger = Ledger::genesis(LedgerConfig::default(), owner, first_airline);
//! let service = FlightSuretyService::new(ledger, bus);
//!
//! service.pay_airline_dues(first_airline, ether(10)).await?;
//! let key = service.register_flight(first_airline, "ND1309".into(), ts).await?;
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod state;
pub mod types;

pub use domain::{
    Airline, ApprovalOutcome, Flight, InsurancePolicy, Oracle, PolicyState, RequestState,
    ResponseKey, StatusRequest,
};
pub use error::{LedgerError, LedgerResult};
pub use ledger::{Ledger, Receipt};
pub use ports::inbound::{FlightSuretyApi, ResponseOutcome};
pub use ports::outbound::{EntropySource, EventPublisher};
pub use service::FlightSuretyService;
pub use state::LedgerState;
pub use types::{LedgerConfig, INDEXES_PER_ORACLE};
