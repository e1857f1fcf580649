//! # Ledger Events
//!
//! Every notification the ledger can emit. Events are published only after the
//! transaction that produced them has committed.

use crate::journal::JournalEntry;
use serde::{Deserialize, Serialize};
use shared_types::{Address, FlightKey, FlightStatus, Wei};

/// All events that can be published to the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    // =========================================================================
    // GOVERNANCE
    // =========================================================================
    /// The operational guard was toggled by the owner.
    OperationalStatusChanged { operational: bool, changed_by: Address },

    // =========================================================================
    // AIRLINES
    // =========================================================================
    /// An airline applied and awaits consensus.
    AirlineApplied { airline: Address, sponsor: Address },

    /// An airline reached the Registered state, directly or by consensus.
    AirlineRegistered { airline: Address, approvals: usize },

    /// A Funded airline voted for an applicant.
    AirlineApproved {
        airline: Address,
        approver: Address,
        approvals: usize,
        required: usize,
    },

    /// An airline paid its dues.
    AirlineFunded { airline: Address, amount: Wei },

    // =========================================================================
    // FLIGHTS & INSURANCE
    // =========================================================================
    /// A Funded airline listed a flight.
    FlightRegistered { key: FlightKey },

    /// A passenger bought a policy.
    InsurancePurchased {
        passenger: Address,
        key: FlightKey,
        premium: Wei,
    },

    /// A policy was credited after an airline-fault finalization.
    PolicyCredited {
        passenger: Address,
        key: FlightKey,
        payout: Wei,
    },

    /// A passenger withdrew credited payouts.
    PayoutWithdrawn { passenger: Address, amount: Wei },

    // =========================================================================
    // ORACLES
    // =========================================================================
    /// An oracle paid the fee and received its indexes.
    OracleRegistered { oracle: Address, indexes: [u8; 3] },

    /// A status request was opened; oracles holding `index` should respond.
    OracleRequest {
        index: u8,
        key: FlightKey,
        requester: Address,
    },

    /// One oracle response was recorded.
    OracleReport {
        index: u8,
        key: FlightKey,
        oracle: Address,
        status: FlightStatus,
    },

    /// A status request reached quorum and the flight status is final.
    FlightStatusInfo {
        index: u8,
        key: FlightKey,
        status: FlightStatus,
    },
}

impl LedgerEvent {
    /// Get the topic for this event.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::OperationalStatusChanged { .. } => EventTopic::Governance,
            Self::AirlineApplied { .. }
            | Self::AirlineRegistered { .. }
            | Self::AirlineApproved { .. }
            | Self::AirlineFunded { .. } => EventTopic::Airlines,
            Self::FlightRegistered { .. } | Self::FlightStatusInfo { .. } => EventTopic::Flights,
            Self::InsurancePurchased { .. }
            | Self::PolicyCredited { .. }
            | Self::PayoutWithdrawn { .. } => EventTopic::Insurance,
            Self::OracleRegistered { .. }
            | Self::OracleRequest { .. }
            | Self::OracleReport { .. } => EventTopic::Oracles,
        }
    }

    /// Short name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::OperationalStatusChanged { .. } => "OperationalStatusChanged",
            Self::AirlineApplied { .. } => "AirlineApplied",
            Self::AirlineRegistered { .. } => "AirlineRegistered",
            Self::AirlineApproved { .. } => "AirlineApproved",
            Self::AirlineFunded { .. } => "AirlineFunded",
            Self::FlightRegistered { .. } => "FlightRegistered",
            Self::InsurancePurchased { .. } => "InsurancePurchased",
            Self::PolicyCredited { .. } => "PolicyCredited",
            Self::PayoutWithdrawn { .. } => "PayoutWithdrawn",
            Self::OracleRegistered { .. } => "OracleRegistered",
            Self::OracleRequest { .. } => "OracleRequest",
            Self::OracleReport { .. } => "OracleReport",
            Self::FlightStatusInfo { .. } => "FlightStatusInfo",
        }
    }
}

/// Event topics for filtering subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Operational guard changes.
    Governance,
    /// Airline lifecycle.
    Airlines,
    /// Flight listing and finalization.
    Flights,
    /// Policies, credits and withdrawals.
    Insurance,
    /// Oracle registration, requests and reports.
    Oracles,
    /// All events (wildcard).
    All,
}

/// Filter for event subscriptions and journal reads.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include (empty = all).
    pub topics: Vec<EventTopic>,
    /// Cursor: only entries with `sequence >= from_sequence`.
    pub from_sequence: u64,
}

impl EventFilter {
    /// Create a filter that matches all events from the start of the journal.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            from_sequence: 0,
        }
    }

    /// Start reading at `sequence` ("from this point forward").
    #[must_use]
    pub fn since(mut self, sequence: u64) -> Self {
        self.from_sequence = sequence;
        self
    }

    /// Check if an event matches the topic part of this filter.
    #[must_use]
    pub fn matches_event(&self, event: &LedgerEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }

    /// Check if a journal entry matches both cursor and topics.
    #[must_use]
    pub fn matches(&self, entry: &JournalEntry) -> bool {
        entry.sequence >= self.from_sequence && self.matches_event(&entry.event)
    }
}
