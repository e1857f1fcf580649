//! # Ledger Metrics
//!
//! Prometheus metrics for the flight surety ledger.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! surety-ledger = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `surety_transactions_committed_total` - Committed transactions (by operation)
//! - `surety_transactions_rejected_total` - Rejected transactions (by operation, reason)
//! - `surety_flights_finalized_total` - Finalized flights (by status)
//! - `surety_policies_credited_total` - Policies credited with a payout
//! - `surety_ledger_balance_ether` - Funds held by the ledger

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_gauge, register_int_counter, register_int_counter_vec, Gauge, IntCounter,
    IntCounterVec,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Committed transactions, labeled by operation
    pub static ref TRANSACTIONS_COMMITTED: IntCounterVec = register_int_counter_vec!(
        "surety_transactions_committed_total",
        "Total number of committed ledger transactions",
        &["operation"]
    )
    .expect("Failed to create TRANSACTIONS_COMMITTED metric");

    /// Rejected transactions, labeled by operation and error kind
    pub static ref TRANSACTIONS_REJECTED: IntCounterVec = register_int_counter_vec!(
        "surety_transactions_rejected_total",
        "Total number of rejected ledger transactions",
        &["operation", "reason"]
    )
    .expect("Failed to create TRANSACTIONS_REJECTED metric");

    /// Finalized flights, labeled by status
    pub static ref FLIGHTS_FINALIZED: IntCounterVec = register_int_counter_vec!(
        "surety_flights_finalized_total",
        "Total number of flights finalized by oracle quorum",
        &["status"]
    )
    .expect("Failed to create FLIGHTS_FINALIZED metric");

    /// Policies credited after an airline-fault delay
    pub static ref POLICIES_CREDITED: IntCounter = register_int_counter!(
        "surety_policies_credited_total",
        "Total number of policies credited with a payout"
    )
    .expect("Failed to create POLICIES_CREDITED metric");

    /// Funds held by the ledger, in ether
    pub static ref LEDGER_BALANCE: Gauge = register_gauge!(
        "surety_ledger_balance_ether",
        "Funds currently held by the ledger (ether)"
    )
    .expect("Failed to create LEDGER_BALANCE metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a committed transaction
#[cfg(feature = "metrics")]
pub fn record_committed(operation: &str) {
    TRANSACTIONS_COMMITTED.with_label_values(&[operation]).inc();
}

/// Record a rejected transaction with its error kind
#[cfg(feature = "metrics")]
pub fn record_rejected(operation: &str, reason: &str) {
    TRANSACTIONS_REJECTED
        .with_label_values(&[operation, reason])
        .inc();
}

/// Record a flight finalization
#[cfg(feature = "metrics")]
pub fn record_flight_finalized(status: &str) {
    FLIGHTS_FINALIZED.with_label_values(&[status]).inc();
}

/// Record credited policies
#[cfg(feature = "metrics")]
pub fn record_policies_credited(count: u64) {
    POLICIES_CREDITED.inc_by(count);
}

/// Update the ledger balance gauge
#[cfg(feature = "metrics")]
pub fn set_ledger_balance(wei: u128) {
    LEDGER_BALANCE.set(wei as f64 / shared_types::ONE_ETHER as f64);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_committed(_operation: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_rejected(_operation: &str, _reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_flight_finalized(_status: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_policies_credited(_count: u64) {}

#[cfg(not(feature = "metrics"))]
pub fn set_ledger_balance(_wei: u128) {}
