//! Ports (Hexagonal Architecture)
//!
//! - inbound: the API the ledger offers to airlines, passengers and oracles
//! - outbound: what the ledger needs from its environment

pub mod inbound;
pub mod outbound;
