//! Operational guard
//!
//! A single owner-controlled switch. While it is off, every mutating
//! operation except the switch itself fails with `NotOperational`.

use crate::error::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use shared_types::Address;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationalGuard {
    owner: Address,
    operational: bool,
}

impl OperationalGuard {
    /// Guard owned by `owner`, initially operational.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            operational: true,
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_operational(&self) -> bool {
        self.operational
    }

    pub fn ensure_operational(&self) -> LedgerResult<()> {
        if self.operational {
            Ok(())
        } else {
            Err(LedgerError::NotOperational)
        }
    }

    /// Set the flag. Returns whether the value actually changed.
    pub fn set(&mut self, caller: Address, operational: bool) -> LedgerResult<bool> {
        if caller != self.owner {
            return Err(LedgerError::Unauthorized {
                caller,
                action: "set operating status",
            });
        }
        let changed = self.operational != operational;
        self.operational = operational;
        Ok(changed)
    }
}
