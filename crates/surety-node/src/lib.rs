//! # surety-node
//!
//! Flight surety node: ledger service, event bus and oracle simulator.
//!
//! ```text
//! NodeRuntime
//!   ├── FlightSuretyService (KeccakEntropy, InMemoryEventBus)
//!   ├── InMemoryEventBus ──OracleRequest──→ OracleSimulator
//!   └── watch::channel shutdown
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod oracles;
pub mod runtime;

pub use config::{ConfigError, NodeConfig};
pub use oracles::{oracle_address, OracleAnswer, OracleSimulator, SimulatedOracle};
pub use runtime::{NodeRuntime, NodeService};
