//! Ledger engine
//!
//! Synchronous, single-writer transaction processor. Every mutating call is
//! split into a check phase over borrowed state and a write phase that cannot
//! fail:
//!
//! ```text
//! caller ──→ transact(op) ──→ checks ──Err──→ reject (no state, nonce or event written)
//!                               │
//!                               └──Ok──→ writes ──→ Receipt { output, events }
//! ```
//!
//! Events are returned in the receipt; publishing them is the caller's job
//! (see `FlightSuretyService`).

use crate::adapters::KeccakEntropy;
use crate::domain::invariants::credit;
use crate::domain::{
    index_from_digest, Airline, ApprovalOutcome, Credit, Flight, InsurancePolicy, Oracle,
    ResponseKey, StatusRequest,
};
use crate::error::{LedgerError, LedgerResult};
use crate::metrics;
use crate::ports::inbound::ResponseOutcome;
use crate::ports::outbound::EntropySource;
use crate::state::LedgerState;
use crate::types::{LedgerConfig, INDEXES_PER_ORACLE};
use shared_bus::LedgerEvent;
use shared_types::{Address, AirlineState, FlightKey, FlightStatus, Wei};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Outcome of a committed transaction.
#[derive(Clone, Debug)]
pub struct Receipt<T> {
    /// Correlates log lines of one transaction
    pub tx_id: Uuid,
    pub output: T,
    /// Events in emission order, to publish after commit
    pub events: Vec<LedgerEvent>,
}

/// View handed to an operation.
///
/// An operation must return every error before its first write to `state`.
pub(crate) struct Transaction<'a, E: EntropySource> {
    config: &'a LedgerConfig,
    entropy: &'a E,
    state: &'a mut LedgerState,
    events: Vec<LedgerEvent>,
}

impl<E: EntropySource> Transaction<'_, E> {
    fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    fn ensure_operational(&self) -> LedgerResult<()> {
        self.state.guard.ensure_operational()
    }

    /// Draw one index in `0..index_range`, consuming a nonce.
    fn draw_index(&mut self, account: &Address) -> u8 {
        let nonce = self.state.next_nonce();
        index_from_digest(&self.entropy.digest(nonce, account), self.config.index_range)
    }

    /// Balance after depositing `amount`. Check only; the caller writes it.
    fn balance_after_deposit(&self, amount: Wei, operation: &'static str) -> LedgerResult<Wei> {
        credit(self.state.balance, amount, operation)
    }
}

/// Flight surety ledger engine.
pub struct Ledger<E: EntropySource> {
    config: LedgerConfig,
    entropy: E,
    state: LedgerState,
}

impl Ledger<KeccakEntropy> {
    /// Ledger using keccak entropy seeded from `config.entropy_seed`.
    pub fn genesis(config: LedgerConfig, owner: Address, first_airline: Address) -> Self {
        let entropy = KeccakEntropy::new(config.entropy_seed);
        Self::new(config, entropy, owner, first_airline)
    }
}

impl<E: EntropySource> Ledger<E> {
    pub fn new(config: LedgerConfig, entropy: E, owner: Address, first_airline: Address) -> Self {
        info!(
            owner = %owner,
            first_airline = %first_airline,
            bootstrap_quota = config.bootstrap_quota,
            min_responses = config.min_responses,
            "Ledger created"
        );
        Self {
            config,
            entropy,
            state: LedgerState::genesis(owner, first_airline),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Committed state.
    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    /// Run `apply` against the state. Events are kept only on success.
    fn transact<T, F>(
        &mut self,
        operation: &'static str,
        caller: Address,
        apply: F,
    ) -> LedgerResult<Receipt<T>>
    where
        F: FnOnce(&mut Transaction<'_, E>) -> LedgerResult<T>,
    {
        let tx_id = Uuid::new_v4();
        let mut tx = Transaction {
            config: &self.config,
            entropy: &self.entropy,
            state: &mut self.state,
            events: Vec::new(),
        };

        let result = apply(&mut tx);
        let events = tx.events;
        match result {
            Ok(output) => {
                metrics::record_committed(operation);
                metrics::set_ledger_balance(self.state.balance);
                debug!(%tx_id, operation, caller = %caller, events = events.len(), "Transaction committed");
                Ok(Receipt {
                    tx_id,
                    output,
                    events,
                })
            }
            Err(err) => {
                metrics::record_rejected(operation, err.kind());
                match err {
                    LedgerError::Unauthorized { .. } | LedgerError::NotOperational => {
                        warn!(%tx_id, operation, caller = %caller, error = %err, "Transaction rejected");
                    }
                    _ => {
                        debug!(%tx_id, operation, caller = %caller, error = %err, "Transaction rejected");
                    }
                }
                Err(err)
            }
        }
    }

    // =========================================================================
    // OPERATIONAL GUARD
    // =========================================================================

    /// Toggle the guard. Returns whether the value changed; a repeat set is
    /// a no-op with no event.
    pub fn set_operating_status(
        &mut self,
        caller: Address,
        operational: bool,
    ) -> LedgerResult<Receipt<bool>> {
        self.transact("set_operating_status", caller, |tx| {
            let changed = tx.state.guard.set(caller, operational)?;
            if changed {
                info!(operational, changed_by = %caller, "Operational status changed");
                tx.emit(LedgerEvent::OperationalStatusChanged {
                    operational,
                    changed_by: caller,
                });
            }
            Ok(changed)
        })
    }

    pub fn is_operational(&self) -> bool {
        self.state.guard.is_operational()
    }

    pub fn owner(&self) -> Address {
        self.state.guard.owner()
    }

    // =========================================================================
    // AIRLINES
    // =========================================================================

    pub fn register_airline(
        &mut self,
        caller: Address,
        airline: Address,
    ) -> LedgerResult<Receipt<AirlineState>> {
        self.transact("register_airline", caller, |tx| {
            tx.ensure_operational()?;
            let quota = tx.config.bootstrap_quota;
            let state = tx.state.airlines.register(caller, airline, quota)?;

            match state {
                AirlineState::Registered => {
                    info!(airline = %airline, sponsor = %caller, "Airline registered (bootstrap)");
                    tx.emit(LedgerEvent::AirlineRegistered {
                        airline,
                        approvals: 0,
                    });
                }
                _ => {
                    info!(airline = %airline, sponsor = %caller, "Airline applied, awaiting consensus");
                    tx.emit(LedgerEvent::AirlineApplied {
                        airline,
                        sponsor: caller,
                    });
                }
            }
            Ok(state)
        })
    }

    pub fn approve_airline(
        &mut self,
        caller: Address,
        airline: Address,
    ) -> LedgerResult<Receipt<ApprovalOutcome>> {
        self.transact("approve_airline", caller, |tx| {
            tx.ensure_operational()?;
            let outcome = tx.state.airlines.approve(caller, airline)?;

            tx.emit(LedgerEvent::AirlineApproved {
                airline,
                approver: caller,
                approvals: outcome.approvals,
                required: outcome.required,
            });
            if outcome.registered {
                info!(
                    airline = %airline,
                    approvals = outcome.approvals,
                    required = outcome.required,
                    "Airline registered by consensus"
                );
                tx.emit(LedgerEvent::AirlineRegistered {
                    airline,
                    approvals: outcome.approvals,
                });
            } else {
                debug!(
                    airline = %airline,
                    approvals = outcome.approvals,
                    required = outcome.required,
                    "Approval recorded"
                );
            }
            Ok(outcome)
        })
    }

    pub fn pay_airline_dues(&mut self, caller: Address, amount: Wei) -> LedgerResult<Receipt<()>> {
        self.transact("pay_airline_dues", caller, |tx| {
            tx.ensure_operational()?;
            let min_funding = tx.config.min_funding;
            let balance = tx.balance_after_deposit(amount, "airline dues")?;
            tx.state.airlines.fund(caller, amount, min_funding)?;
            tx.state.balance = balance;

            info!(airline = %caller, amount, "Airline funded");
            tx.emit(LedgerEvent::AirlineFunded {
                airline: caller,
                amount,
            });
            Ok(())
        })
    }

    pub fn is_airline(&self, id: &Address) -> bool {
        self.state.airlines.contains(id)
    }

    pub fn airline_state(&self, id: &Address) -> Option<AirlineState> {
        self.state.airlines.state_of(id)
    }

    /// Distinct approvals recorded for `id` (zero if unknown).
    pub fn approvals_count(&self, id: &Address) -> usize {
        self.state
            .airlines
            .get(id)
            .map_or(0, |airline| airline.approvals.len())
    }

    /// Registered-or-Funded airlines.
    pub fn number_of_airlines(&self) -> usize {
        self.state.airlines.participant_count()
    }

    pub fn airline(&self, id: &Address) -> Option<Airline> {
        self.state.airlines.get(id).cloned()
    }

    /// Every airline in registration order.
    pub fn airlines(&self) -> Vec<Airline> {
        self.state.airlines.iter().cloned().collect()
    }

    // =========================================================================
    // FLIGHTS
    // =========================================================================

    pub fn register_flight(
        &mut self,
        caller: Address,
        flight: impl Into<String>,
        timestamp: u64,
    ) -> LedgerResult<Receipt<FlightKey>> {
        let key = FlightKey::new(caller, flight, timestamp);
        self.transact("register_flight", caller, |tx| {
            tx.ensure_operational()?;
            if tx.state.airlines.state_of(&caller) != Some(AirlineState::Funded) {
                return Err(LedgerError::Unauthorized {
                    caller,
                    action: "register flights",
                });
            }
            tx.state.flights.register(key.clone())?;

            info!(flight = %key, "Flight registered");
            tx.emit(LedgerEvent::FlightRegistered { key: key.clone() });
            Ok(key)
        })
    }

    pub fn flight(&self, position: usize) -> Option<Flight> {
        self.state.flights.get(position).cloned()
    }

    pub fn flights_count(&self) -> usize {
        self.state.flights.len()
    }

    pub fn flight_by_key(&self, key: &FlightKey) -> Option<Flight> {
        self.state.flights.by_key(key).cloned()
    }

    // =========================================================================
    // INSURANCE
    // =========================================================================

    /// Buy a policy. `funds_sent` is held in escrow in full.
    pub fn purchase_insurance(
        &mut self,
        buyer: Address,
        key: FlightKey,
        premium: Wei,
        funds_sent: Wei,
    ) -> LedgerResult<Receipt<()>> {
        self.transact("purchase_insurance", buyer, |tx| {
            tx.ensure_operational()?;
            tx.state.flights.pending(&key)?;
            if tx.state.policies.has_active(&buyer, &key) {
                return Err(LedgerError::DuplicatePolicy {
                    owner: buyer,
                    flight: key,
                });
            }

            let cap = tx.config.premium_cap;
            let charged = premium.max(funds_sent);
            if charged > cap {
                return Err(LedgerError::PremiumExceedsCap {
                    amount: charged,
                    cap,
                });
            }
            if premium == 0 || funds_sent < premium {
                return Err(LedgerError::InsufficientFunds {
                    required: premium.max(1),
                    provided: funds_sent,
                });
            }

            let balance = tx.balance_after_deposit(funds_sent, "premium escrow")?;
            tx.state
                .policies
                .open(buyer, key.clone(), premium, funds_sent)?;
            tx.state.balance = balance;

            info!(passenger = %buyer, flight = %key, premium, "Insurance purchased");
            tx.emit(LedgerEvent::InsurancePurchased {
                passenger: buyer,
                key,
                premium,
            });
            Ok(())
        })
    }

    /// Pay out every credited policy of `buyer`. Returns the amount.
    pub fn withdraw(&mut self, buyer: Address) -> LedgerResult<Receipt<Wei>> {
        self.transact("withdraw", buyer, |tx| {
            tx.ensure_operational()?;
            let amount = tx.state.policies.payable(&buyer)?;
            if amount == 0 {
                return Err(LedgerError::NothingToWithdraw { owner: buyer });
            }
            if tx.state.balance < amount {
                return Err(LedgerError::InsufficientFunds {
                    required: amount,
                    provided: tx.state.balance,
                });
            }

            tx.state.policies.withdraw_all(&buyer)?;
            tx.state.balance -= amount;

            info!(passenger = %buyer, amount, "Payout withdrawn");
            tx.emit(LedgerEvent::PayoutWithdrawn {
                passenger: buyer,
                amount,
            });
            Ok(amount)
        })
    }

    /// Most recent policy `owner` holds on `key`.
    pub fn policy(&self, owner: &Address, key: &FlightKey) -> Option<InsurancePolicy> {
        self.state.policies.get(owner, key).cloned()
    }

    pub fn policies_of(&self, owner: &Address) -> Vec<InsurancePolicy> {
        self.state.policies.of_owner(owner).cloned().collect()
    }

    /// Credited payouts not yet withdrawn.
    pub fn payable_balance(&self, owner: &Address) -> LedgerResult<Wei> {
        self.state.policies.payable(owner)
    }

    /// Funds held by the ledger.
    pub fn ledger_balance(&self) -> Wei {
        self.state.balance
    }

    // =========================================================================
    // ORACLES
    // =========================================================================

    /// Register `caller` as an oracle and assign its indexes.
    pub fn register_oracle(
        &mut self,
        caller: Address,
        fee: Wei,
    ) -> LedgerResult<Receipt<[u8; INDEXES_PER_ORACLE]>> {
        self.transact("register_oracle", caller, |tx| {
            tx.ensure_operational()?;
            if fee < tx.config.oracle_fee {
                return Err(LedgerError::InsufficientFunds {
                    required: tx.config.oracle_fee,
                    provided: fee,
                });
            }
            if tx.state.oracles.contains_key(&caller) {
                return Err(LedgerError::AlreadyExists {
                    entity: "oracle",
                    id: caller.to_string(),
                });
            }

            let balance = tx.balance_after_deposit(fee, "oracle fee")?;

            let mut indexes = [0u8; INDEXES_PER_ORACLE];
            for slot in indexes.iter_mut() {
                *slot = tx.draw_index(&caller);
            }
            tx.state.oracles.insert(
                caller,
                Oracle {
                    id: caller,
                    indexes,
                    fee_paid: fee,
                },
            );
            tx.state.balance = balance;

            info!(oracle = %caller, ?indexes, "Oracle registered");
            tx.emit(LedgerEvent::OracleRegistered {
                oracle: caller,
                indexes,
            });
            Ok(indexes)
        })
    }

    pub fn is_oracle(&self, id: &Address) -> bool {
        self.state.oracles.contains_key(id)
    }

    pub fn oracle_indexes(&self, caller: &Address) -> LedgerResult<[u8; INDEXES_PER_ORACLE]> {
        self.state
            .oracles
            .get(caller)
            .map(|oracle| oracle.indexes)
            .ok_or_else(|| LedgerError::NotFound {
                entity: "oracle",
                id: caller.to_string(),
            })
    }

    /// Route a status request to one random index. Returns that index.
    pub fn fetch_flight_status(&mut self, caller: Address, key: FlightKey) -> LedgerResult<Receipt<u8>> {
        self.transact("fetch_flight_status", caller, |tx| {
            tx.ensure_operational()?;
            tx.state.flights.pending(&key)?;

            let index = tx.draw_index(&caller);
            let response_key = ResponseKey::new(index, key.clone());
            tx.state
                .requests
                .entry(response_key.clone())
                .or_insert_with(|| StatusRequest::open(response_key, caller));

            info!(index, flight = %key, requester = %caller, "Oracle request opened");
            tx.emit(LedgerEvent::OracleRequest {
                index,
                key,
                requester: caller,
            });
            Ok(index)
        })
    }

    /// Record an oracle report; may finalize the flight and credit policies.
    pub fn submit_oracle_response(
        &mut self,
        caller: Address,
        index: u8,
        key: FlightKey,
        status_code: u8,
    ) -> LedgerResult<Receipt<ResponseOutcome>> {
        self.transact("submit_oracle_response", caller, |tx| {
            tx.ensure_operational()?;
            let status = FlightStatus::try_from(status_code)
                .map_err(|_| LedgerError::InvalidStatusCode(status_code))?;

            let holds_index = tx
                .state
                .oracles
                .get(&caller)
                .is_some_and(|oracle| oracle.holds(index));
            if !holds_index {
                return Err(LedgerError::Unauthorized {
                    caller,
                    action: "respond at this index",
                });
            }

            let quorum = tx.config.min_responses;
            let response_key = ResponseKey::new(index, key.clone());
            let finalizes = tx
                .state
                .requests
                .get(&response_key)
                .ok_or_else(|| LedgerError::RequestNotOpen {
                    index,
                    flight: key.clone(),
                })?
                .admit(&caller, status, quorum)?;

            // A finalizing response is checked against the flight and the
            // payouts before anything is recorded.
            let credits = if finalizes {
                tx.state.flights.check_finalize(&key, status)?;
                let (numerator, denominator) =
                    (tx.config.payout_numerator, tx.config.payout_denominator);
                tx.state
                    .policies
                    .assess_flight(&key, status, numerator, denominator)?
            } else {
                Vec::new()
            };

            let finalized = match tx.state.requests.get_mut(&response_key) {
                Some(request) => request.record(caller, status, quorum)?,
                None => None,
            };

            debug!(index, flight = %key, oracle = %caller, %status, "Oracle response recorded");
            tx.emit(LedgerEvent::OracleReport {
                index,
                key: key.clone(),
                oracle: caller,
                status,
            });

            let mut outcome = ResponseOutcome {
                status,
                finalized,
                credited: 0,
            };
            if let Some(final_status) = finalized {
                outcome.credited = Self::finalize_flight(tx, index, &key, final_status, &credits);
            }
            Ok(outcome)
        })
    }

    /// Write the flight status, close sibling requests and credit policies.
    fn finalize_flight(
        tx: &mut Transaction<'_, E>,
        index: u8,
        key: &FlightKey,
        status: FlightStatus,
        credits: &[Credit],
    ) -> usize {
        tx.state.flights.set_status(key, status);
        for sibling in 0..tx.config.index_range {
            if let Some(request) = tx.state.requests.get_mut(&ResponseKey::new(sibling, key.clone())) {
                request.close(status);
            }
        }

        info!(index, flight = %key, %status, "Flight status finalized");
        metrics::record_flight_finalized(status.name());
        tx.emit(LedgerEvent::FlightStatusInfo {
            index,
            key: key.clone(),
            status,
        });

        tx.state.policies.apply_credits(credits);
        for credit in credits {
            info!(passenger = %credit.owner, flight = %key, payout = credit.payout, "Policy credited");
            tx.emit(LedgerEvent::PolicyCredited {
                passenger: credit.owner,
                key: key.clone(),
                payout: credit.payout,
            });
        }
        metrics::record_policies_credited(credits.len() as u64);
        credits.len()
    }

    pub fn status_request(&self, key: &ResponseKey) -> Option<StatusRequest> {
        self.state.requests.get(key).cloned()
    }
}
