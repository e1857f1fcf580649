//! Airline registry
//!
//! ```text
//! register (participants < quota) ──→ [Registered] ──pay dues──→ [Funded]
//! register (participants >= quota) ──→ [Applied] ──votes >= ceil(n/2)──┘
//! ```

use crate::domain::invariants::consensus_threshold;
use crate::error::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use shared_types::{Address, AirlineState, Wei};
use std::collections::{BTreeSet, HashMap};

/// One airline and its onboarding record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airline {
    pub id: Address,
    pub state: AirlineState,
    /// Dues paid, overpayment included
    pub funded: Wei,
    /// Distinct Funded airlines that voted for this one
    pub approvals: BTreeSet<Address>,
    /// Airline that submitted the registration (none for genesis)
    pub sponsor: Option<Address>,
}

impl Airline {
    fn new(id: Address, state: AirlineState, sponsor: Option<Address>) -> Self {
        Self {
            id,
            state,
            funded: 0,
            approvals: BTreeSet::new(),
            sponsor,
        }
    }
}

/// Result of one approval vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalOutcome {
    pub approvals: usize,
    pub required: usize,
    /// The vote promoted the applicant to Registered
    pub registered: bool,
}

/// All airlines in insertion order.
#[derive(Clone, Debug, Default)]
pub struct AirlineRegistry {
    airlines: HashMap<Address, Airline>,
    order: Vec<Address>,
}

impl AirlineRegistry {
    /// Registry holding the genesis airline in state Registered.
    pub fn with_genesis(first: Address) -> Self {
        let mut registry = Self::default();
        registry.insert(Airline::new(first, AirlineState::Registered, None));
        registry
    }

    fn insert(&mut self, airline: Airline) {
        self.order.push(airline.id);
        self.airlines.insert(airline.id, airline);
    }

    pub fn get(&self, id: &Address) -> Option<&Airline> {
        self.airlines.get(id)
    }

    pub fn contains(&self, id: &Address) -> bool {
        self.airlines.contains_key(id)
    }

    pub fn state_of(&self, id: &Address) -> Option<AirlineState> {
        self.airlines.get(id).map(|a| a.state)
    }

    /// Registered-or-Funded count; the consensus denominator.
    pub fn participant_count(&self) -> usize {
        self.airlines
            .values()
            .filter(|a| a.state.is_participant())
            .count()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Airline> {
        self.order.iter().filter_map(|id| self.airlines.get(id))
    }

    /// Add `new_id` on behalf of `sponsor`. Returns the state it was created in.
    pub fn register(
        &mut self,
        sponsor: Address,
        new_id: Address,
        bootstrap_quota: usize,
    ) -> LedgerResult<AirlineState> {
        let sponsor_ok = self
            .state_of(&sponsor)
            .is_some_and(AirlineState::is_participant);
        if !sponsor_ok {
            return Err(LedgerError::Unauthorized {
                caller: sponsor,
                action: "register airlines",
            });
        }
        if self.contains(&new_id) {
            return Err(LedgerError::AlreadyExists {
                entity: "airline",
                id: new_id.to_string(),
            });
        }

        let state = if self.participant_count() < bootstrap_quota {
            AirlineState::Registered
        } else {
            AirlineState::Applied
        };
        self.insert(Airline::new(new_id, state, Some(sponsor)));
        Ok(state)
    }

    /// Record a vote from `approver` for `target`.
    ///
    /// The threshold is computed from the participant count before the vote
    /// takes effect.
    pub fn approve(&mut self, approver: Address, target: Address) -> LedgerResult<ApprovalOutcome> {
        if self.state_of(&approver) != Some(AirlineState::Funded) || approver == target {
            return Err(LedgerError::Unauthorized {
                caller: approver,
                action: "approve airlines",
            });
        }

        let required = consensus_threshold(self.participant_count());
        let airline = self
            .airlines
            .get_mut(&target)
            .ok_or_else(|| LedgerError::airline_not_found(&target))?;

        if airline.state != AirlineState::Applied {
            return Err(LedgerError::airline_state(&target, airline.state, "Applied"));
        }
        if !airline.approvals.insert(approver) {
            return Err(LedgerError::DuplicateVote {
                approver,
                airline: target,
            });
        }

        let approvals = airline.approvals.len();
        let registered = approvals >= required;
        if registered {
            airline.state = AirlineState::Registered;
        }
        Ok(ApprovalOutcome {
            approvals,
            required,
            registered,
        })
    }

    /// Pay dues. Only an airline that is exactly Registered may fund.
    pub fn fund(&mut self, id: Address, amount: Wei, min_funding: Wei) -> LedgerResult<()> {
        let airline = self
            .airlines
            .get_mut(&id)
            .ok_or_else(|| LedgerError::airline_not_found(&id))?;

        if airline.state != AirlineState::Registered {
            return Err(LedgerError::airline_state(&id, airline.state, "Registered"));
        }
        if amount < min_funding {
            return Err(LedgerError::InsufficientFunds {
                required: min_funding,
                provided: amount,
            });
        }

        airline.funded = amount;
        airline.state = AirlineState::Funded;
        Ok(())
    }
}
