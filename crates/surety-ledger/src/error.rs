//! Error types for the flight surety ledger
//!
//! Every failure is terminal for the transaction that raised it: it is raised
//! before the first write, and its buffered events are never published.

use shared_types::{Address, AirlineState, FlightKey, Wei};
use thiserror::Error;

/// Ledger errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Guard is disabled; only reads and the owner toggle are available
    #[error("Ledger is not operational")]
    NotOperational,

    /// Caller lacks the role or state required for the action
    #[error("Unauthorized: {caller} may not {action}")]
    Unauthorized {
        caller: Address,
        action: &'static str,
    },

    /// Entity exists but is in the wrong lifecycle stage
    #[error("Invalid state for {subject}: {reason}")]
    InvalidState { subject: String, reason: String },

    /// Identity or key already taken
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// Identity or key unknown
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Amount below what the operation requires
    #[error("Insufficient funds: required {required} wei, provided {provided} wei")]
    InsufficientFunds { required: Wei, provided: Wei },

    /// Premium or funds sent above the insurance cap
    #[error("Premium {amount} wei exceeds cap of {cap} wei")]
    PremiumExceedsCap { amount: Wei, cap: Wei },

    /// Buyer already holds an active policy on the flight
    #[error("{owner} already holds an active policy on {flight}")]
    DuplicatePolicy { owner: Address, flight: FlightKey },

    /// Approver already voted for the applicant
    #[error("{approver} already approved {airline}")]
    DuplicateVote { approver: Address, airline: Address },

    /// Oracle already answered this correlation key
    #[error("Oracle {oracle} already responded to index {index} for {flight}")]
    DuplicateResponse {
        oracle: Address,
        index: u8,
        flight: FlightKey,
    },

    /// No status request was ever opened at this correlation key
    #[error("No status request open at index {index} for {flight}")]
    RequestNotOpen { index: u8, flight: FlightKey },

    /// Caller has no credited payouts
    #[error("Nothing to withdraw for {owner}")]
    NothingToWithdraw { owner: Address },

    /// Status code outside the oracle protocol
    #[error("Invalid status code: {0}")]
    InvalidStatusCode(u8),

    /// Checked money arithmetic failed
    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow { operation: &'static str },
}

impl LedgerError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotOperational => "not_operational",
            Self::Unauthorized { .. } => "unauthorized",
            Self::InvalidState { .. } => "invalid_state",
            Self::AlreadyExists { .. } => "already_exists",
            Self::NotFound { .. } => "not_found",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::PremiumExceedsCap { .. } => "premium_exceeds_cap",
            Self::DuplicatePolicy { .. } => "duplicate_policy",
            Self::DuplicateVote { .. } => "duplicate_vote",
            Self::DuplicateResponse { .. } => "duplicate_response",
            Self::RequestNotOpen { .. } => "request_not_open",
            Self::NothingToWithdraw { .. } => "nothing_to_withdraw",
            Self::InvalidStatusCode(_) => "invalid_status_code",
            Self::ArithmeticOverflow { .. } => "arithmetic_overflow",
        }
    }

    pub(crate) fn airline_not_found(id: &Address) -> Self {
        Self::NotFound {
            entity: "airline",
            id: id.to_string(),
        }
    }

    pub(crate) fn flight_not_found(key: &FlightKey) -> Self {
        Self::NotFound {
            entity: "flight",
            id: key.to_string(),
        }
    }

    pub(crate) fn airline_state(id: &Address, actual: AirlineState, expected: &str) -> Self {
        Self::InvalidState {
            subject: format!("airline {}", id),
            reason: format!("is {:?}, expected {}", actual, expected),
        }
    }

    pub(crate) fn overflow(operation: &'static str) -> Self {
        Self::ArithmeticOverflow { operation }
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
