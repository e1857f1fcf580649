//! Domain module for the flight surety ledger
//!
//! ## Core Modules
//! - guard: Owner-controlled operational switch
//! - airline: Onboarding state machine with consensus gate
//! - flight: Flight listing and one-time status write
//! - policy: Insurance policies, payouts and withdrawals
//! - oracle: Status requests and quorum aggregation
//! - invariants: Thresholds and checked money math

pub mod airline;
pub mod flight;
pub mod guard;
pub mod invariants;
pub mod oracle;
pub mod policy;

pub use airline::{Airline, AirlineRegistry, ApprovalOutcome};
pub use flight::{Flight, FlightRegistry};
pub use guard::OperationalGuard;
pub use invariants::{compute_payout, consensus_threshold, index_from_digest};
pub use oracle::{Oracle, RequestState, ResponseKey, StatusRequest};
pub use policy::{Credit, InsurancePolicy, PolicyBook, PolicyState};
