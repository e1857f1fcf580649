//! # Node Configuration
//!
//! Runtime parameters read from the environment.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FS_OWNER` | `0x…01` | Ledger owner (controls the operational guard) |
//! | `FS_FIRST_AIRLINE` | `0x…02` | Genesis airline, created Registered |
//! | `FS_ORACLE_COUNT` | `20` | Simulated oracles to register at startup |
//! | `FS_ENTROPY_SEED` | `0` | Seed for index selection |

use shared_types::Address;
use std::env;
use surety_ledger::LedgerConfig;
use thiserror::Error;

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub owner: Address,
    pub first_airline: Address,
    /// Oracles the simulator registers.
    pub oracle_count: u32,
    /// Ledger rules; `entropy_seed` is overridden from the environment.
    pub ledger: LedgerConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            owner: Address::from_low_u8(1),
            first_airline: Address::from_low_u8(2),
            oracle_count: 20,
            ledger: LedgerConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid address: '{value}'")]
    InvalidAddress { var: &'static str, value: String },

    #[error("{var} is not a valid number: '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{count} oracles can never reach a quorum of {quorum}")]
    QuorumUnreachable { count: u32, quorum: usize },

    #[error("Owner and first airline must differ ({0})")]
    OwnerIsAirline(Address),
}

impl NodeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("FS_OWNER") {
            config.owner = parse_address("FS_OWNER", value)?;
        }
        if let Some(value) = lookup("FS_FIRST_AIRLINE") {
            config.first_airline = parse_address("FS_FIRST_AIRLINE", value)?;
        }
        if let Some(value) = lookup("FS_ORACLE_COUNT") {
            config.oracle_count = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber {
                    var: "FS_ORACLE_COUNT",
                    value,
                })?;
        }
        if let Some(value) = lookup("FS_ENTROPY_SEED") {
            config.ledger.entropy_seed = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber {
                    var: "FS_ENTROPY_SEED",
                    value,
                })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.owner == self.first_airline {
            return Err(ConfigError::OwnerIsAirline(self.owner));
        }
        // Zero oracles disables the simulator; anything else must be able to finalize.
        let count = self.oracle_count;
        if count != 0 && (count as usize) < self.ledger.min_responses {
            return Err(ConfigError::QuorumUnreachable {
                count,
                quorum: self.ledger.min_responses,
            });
        }
        Ok(())
    }
}

fn parse_address(var: &'static str, value: String) -> Result<Address, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidAddress { var, value })
}
