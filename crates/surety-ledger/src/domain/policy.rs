//! Insurance policies and escrow bookkeeping
//!
//! ```text
//! purchase ──→ [Active] ──airline-fault finalization──→ [Paid] ──withdraw──→ [Withdrawn]
//! ```
//!
//! A non-fault finalization leaves the policy Active with no payout.

use crate::domain::invariants::{compute_payout, credit};
use crate::error::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use shared_types::{Address, FlightKey, FlightStatus, Wei};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyState {
    Active,
    Paid,
    Withdrawn,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsurancePolicy {
    pub owner: Address,
    pub flight: FlightKey,
    pub premium: Wei,
    /// Funds the buyer sent with the purchase, held by the ledger
    pub escrowed: Wei,
    /// Credited amount; zero until Paid
    pub payout: Wei,
    pub state: PolicyState,
}

/// A payout owed to one Active policy at finalization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credit {
    pub owner: Address,
    pub payout: Wei,
    position: usize,
}

#[derive(Clone, Debug, Default)]
pub struct PolicyBook {
    policies: Vec<InsurancePolicy>,
    by_flight: HashMap<FlightKey, Vec<usize>>,
    by_owner: HashMap<Address, Vec<usize>>,
}

impl PolicyBook {
    /// Create an Active policy. Caps and amounts are validated by the caller.
    pub fn open(
        &mut self,
        owner: Address,
        flight: FlightKey,
        premium: Wei,
        escrowed: Wei,
    ) -> LedgerResult<()> {
        if self.has_active(&owner, &flight) {
            return Err(LedgerError::DuplicatePolicy { owner, flight });
        }

        let position = self.policies.len();
        self.by_flight.entry(flight.clone()).or_default().push(position);
        self.by_owner.entry(owner).or_default().push(position);
        self.policies.push(InsurancePolicy {
            owner,
            flight,
            premium,
            escrowed,
            payout: 0,
            state: PolicyState::Active,
        });
        Ok(())
    }

    pub fn has_active(&self, owner: &Address, flight: &FlightKey) -> bool {
        self.of_owner(owner)
            .any(|p| &p.flight == flight && p.state == PolicyState::Active)
    }

    /// Most recent policy `owner` holds on `flight`, in any state.
    pub fn get(&self, owner: &Address, flight: &FlightKey) -> Option<&InsurancePolicy> {
        self.of_owner(owner).filter(|p| &p.flight == flight).last()
    }

    pub fn of_owner<'a>(&'a self, owner: &Address) -> impl Iterator<Item = &'a InsurancePolicy> + 'a {
        self.by_owner
            .get(owner)
            .into_iter()
            .flatten()
            .filter_map(|&i| self.policies.get(i))
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Sum of Paid payouts not yet withdrawn.
    pub fn payable(&self, owner: &Address) -> LedgerResult<Wei> {
        self.of_owner(owner)
            .filter(|p| p.state == PolicyState::Paid)
            .try_fold(0, |sum, p| credit(sum, p.payout, "payable balance"))
    }

    /// Payouts owed to the Active policies on `flight` for the finalized
    /// `status`. Reads only; see [`PolicyBook::apply_credits`].
    pub fn assess_flight(
        &self,
        flight: &FlightKey,
        status: FlightStatus,
        numerator: u128,
        denominator: u128,
    ) -> LedgerResult<Vec<Credit>> {
        if !status.is_airline_fault() {
            return Ok(Vec::new());
        }
        let Some(positions) = self.by_flight.get(flight) else {
            return Ok(Vec::new());
        };

        let mut credits = Vec::new();
        for &position in positions {
            let Some(policy) = self.policies.get(position) else {
                continue;
            };
            if policy.state != PolicyState::Active {
                continue;
            }
            credits.push(Credit {
                owner: policy.owner,
                payout: compute_payout(policy.premium, numerator, denominator)?,
                position,
            });
        }
        Ok(credits)
    }

    /// Mark assessed policies Paid.
    pub fn apply_credits(&mut self, credits: &[Credit]) {
        for credit in credits {
            if let Some(policy) = self.policies.get_mut(credit.position) {
                policy.payout = credit.payout;
                policy.state = PolicyState::Paid;
            }
        }
    }

    /// Mark every Paid policy of `owner` Withdrawn and return the total.
    pub fn withdraw_all(&mut self, owner: &Address) -> LedgerResult<Wei> {
        let amount = self.payable(owner)?;
        if amount == 0 {
            return Err(LedgerError::NothingToWithdraw { owner: *owner });
        }
        let positions = self.by_owner.get(owner).cloned().unwrap_or_default();
        for i in positions {
            if let Some(policy) = self.policies.get_mut(i) {
                if policy.state == PolicyState::Paid {
                    policy.state = PolicyState::Withdrawn;
                }
            }
        }
        Ok(amount)
    }
}
