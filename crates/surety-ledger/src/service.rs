//! Flight Surety Service
//!
//! Async facade over the [`Ledger`] engine. Transactions are serialized by a
//! `tokio::sync::Mutex`; committed events are published while the lock is
//! still held, so the event journal order equals commit order.

use crate::domain::{Airline, ApprovalOutcome, Flight, InsurancePolicy, ResponseKey, StatusRequest};
use crate::error::LedgerResult;
use crate::ledger::{Ledger, Receipt};
use crate::ports::inbound::{FlightSuretyApi, ResponseOutcome};
use crate::ports::outbound::{EntropySource, EventPublisher};
use crate::types::INDEXES_PER_ORACLE;
use async_trait::async_trait;
use shared_types::{Address, AirlineState, FlightKey, Wei};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Flight surety service implementation
pub struct FlightSuretyService<E, P>
where
    E: EntropySource,
    P: EventPublisher,
{
    ledger: Mutex<Ledger<E>>,
    publisher: Arc<P>,
}

impl<E, P> FlightSuretyService<E, P>
where
    E: EntropySource,
    P: EventPublisher,
{
    pub fn new(ledger: Ledger<E>, publisher: Arc<P>) -> Self {
        Self {
            ledger: Mutex::new(ledger),
            publisher,
        }
    }

    pub fn publisher(&self) -> &Arc<P> {
        &self.publisher
    }

    /// Apply one transaction and publish its events before releasing the lock.
    async fn execute<T, F>(&self, apply: F) -> LedgerResult<T>
    where
        F: FnOnce(&mut Ledger<E>) -> LedgerResult<Receipt<T>> + Send,
        T: Send,
    {
        let mut ledger = self.ledger.lock().await;
        let receipt = apply(&mut ledger)?;

        for event in receipt.events {
            let sequence = self.publisher.publish(event).await;
            debug!(tx_id = %receipt.tx_id, sequence, "Event published");
        }
        Ok(receipt.output)
    }

    /// Run a read against committed state.
    async fn read<T, F>(&self, query: F) -> T
    where
        F: FnOnce(&Ledger<E>) -> T + Send,
    {
        let ledger = self.ledger.lock().await;
        query(&ledger)
    }
}

#[async_trait]
impl<E, P> FlightSuretyApi for FlightSuretyService<E, P>
where
    E: EntropySource + 'static,
    P: EventPublisher + 'static,
{
    async fn set_operating_status(&self, caller: Address, operational: bool) -> LedgerResult<bool> {
        self.execute(|l| l.set_operating_status(caller, operational))
            .await
    }

    async fn is_operational(&self) -> bool {
        self.read(|l| l.is_operational()).await
    }

    async fn register_airline(&self, caller: Address, airline: Address) -> LedgerResult<AirlineState> {
        self.execute(|l| l.register_airline(caller, airline)).await
    }

    async fn approve_airline(&self, caller: Address, airline: Address) -> LedgerResult<ApprovalOutcome> {
        self.execute(|l| l.approve_airline(caller, airline)).await
    }

    async fn pay_airline_dues(&self, caller: Address, amount: Wei) -> LedgerResult<()> {
        self.execute(|l| l.pay_airline_dues(caller, amount)).await
    }

    async fn is_airline(&self, id: Address) -> bool {
        self.read(|l| l.is_airline(&id)).await
    }

    async fn airline_state(&self, id: Address) -> Option<AirlineState> {
        self.read(|l| l.airline_state(&id)).await
    }

    async fn approvals_count(&self, id: Address) -> usize {
        self.read(|l| l.approvals_count(&id)).await
    }

    async fn number_of_airlines(&self) -> usize {
        self.read(|l| l.number_of_airlines()).await
    }

    async fn airline(&self, id: Address) -> Option<Airline> {
        self.read(|l| l.airline(&id)).await
    }

    async fn airlines(&self) -> Vec<Airline> {
        self.read(|l| l.airlines()).await
    }

    async fn register_flight(&self, caller: Address, flight: String, timestamp: u64) -> LedgerResult<FlightKey> {
        self.execute(|l| l.register_flight(caller, flight, timestamp))
            .await
    }

    async fn flight(&self, position: usize) -> Option<Flight> {
        self.read(|l| l.flight(position)).await
    }

    async fn flights_count(&self) -> usize {
        self.read(|l| l.flights_count()).await
    }

    async fn flight_by_key(&self, key: FlightKey) -> Option<Flight> {
        self.read(|l| l.flight_by_key(&key)).await
    }

    async fn purchase_insurance(
        &self,
        buyer: Address,
        key: FlightKey,
        premium: Wei,
        funds_sent: Wei,
    ) -> LedgerResult<()> {
        self.execute(|l| l.purchase_insurance(buyer, key, premium, funds_sent))
            .await
    }

    async fn withdraw(&self, buyer: Address) -> LedgerResult<Wei> {
        self.execute(|l| l.withdraw(buyer)).await
    }

    async fn policy(&self, owner: Address, key: FlightKey) -> Option<InsurancePolicy> {
        self.read(|l| l.policy(&owner, &key)).await
    }

    async fn policies_of(&self, owner: Address) -> Vec<InsurancePolicy> {
        self.read(|l| l.policies_of(&owner)).await
    }

    async fn payable_balance(&self, owner: Address) -> LedgerResult<Wei> {
        self.read(|l| l.payable_balance(&owner)).await
    }

    async fn ledger_balance(&self) -> Wei {
        self.read(|l| l.ledger_balance()).await
    }

    async fn register_oracle(&self, caller: Address, fee: Wei) -> LedgerResult<[u8; INDEXES_PER_ORACLE]> {
        self.execute(|l| l.register_oracle(caller, fee)).await
    }

    async fn oracle_indexes(&self, caller: Address) -> LedgerResult<[u8; INDEXES_PER_ORACLE]> {
        self.read(|l| l.oracle_indexes(&caller)).await
    }

    async fn fetch_flight_status(&self, caller: Address, key: FlightKey) -> LedgerResult<u8> {
        self.execute(|l| l.fetch_flight_status(caller, key)).await
    }

    async fn submit_oracle_response(
        &self,
        caller: Address,
        index: u8,
        key: FlightKey,
        status_code: u8,
    ) -> LedgerResult<ResponseOutcome> {
        self.execute(|l| l.submit_oracle_response(caller, index, key, status_code))
            .await
    }

    async fn status_request(&self, key: ResponseKey) -> Option<StatusRequest> {
        self.read(|l| l.status_request(&key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{RecordingPublisher, ScriptedEntropy};
    use crate::error::LedgerError;
    use crate::types::LedgerConfig;
    use shared_bus::{EventFilter, EventTopic, InMemoryEventBus, LedgerEvent};
    use shared_types::{ether, milli_ether, FlightStatus};

    const OWNER: Address = Address::from_low_u8(1);
    const FIRST: Address = Address::from_low_u8(11);
    const PASSENGER: Address = Address::from_low_u8(50);

    fn oracle(n: u8) -> Address {
        Address::from_low_u8(100 + n)
    }

    fn create_test_service() -> FlightSuretyService<ScriptedEntropy, RecordingPublisher> {
        let ledger = Ledger::new(
            LedgerConfig::default(),
            ScriptedEntropy::constant(2),
            OWNER,
            FIRST,
        );
        FlightSuretyService::new(ledger, Arc::new(RecordingPublisher::new()))
    }

    #[tokio::test]
    async fn test_service_publishes_committed_events_only() {
        let service = create_test_service();

        service.pay_airline_dues(FIRST, ether(10)).await.unwrap();
        let err = service.pay_airline_dues(FIRST, ether(10)).await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidState { .. }));
        let err = service.set_operating_status(PASSENGER, false).await.unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized { .. }));

        assert_eq!(service.publisher().names(), vec!["AirlineFunded"]);
    }

    #[tokio::test]
    async fn test_service_reads() {
        let service = create_test_service();
        assert!(service.is_operational().await);
        assert!(service.is_airline(FIRST).await);
        assert_eq!(service.airline_state(FIRST).await, Some(AirlineState::Registered));
        assert_eq!(service.number_of_airlines().await, 1);
        assert_eq!(service.flights_count().await, 0);
        assert!(service.flight(0).await.is_none());
        assert_eq!(service.ledger_balance().await, 0);
        assert!(service.policies_of(PASSENGER).await.is_empty());
    }

    #[tokio::test]
    async fn test_service_full_payout_flow() {
        let service = create_test_service();
        service.pay_airline_dues(FIRST, ether(10)).await.unwrap();
        let key = service
            .register_flight(FIRST, "ND1309".to_string(), 1_700_000_000)
            .await
            .unwrap();

        for n in 1..=3 {
            assert_eq!(service.register_oracle(oracle(n), ether(1)).await.unwrap(), [2, 2, 2]);
        }
        service
            .purchase_insurance(PASSENGER, key.clone(), milli_ether(100), milli_ether(100))
            .await
            .unwrap();

        let index = service.fetch_flight_status(PASSENGER, key.clone()).await.unwrap();
        assert_eq!(index, 2);
        for n in 1..=3 {
            service
                .submit_oracle_response(oracle(n), index, key.clone(), FlightStatus::LateAirline.code())
                .await
                .unwrap();
        }

        assert_eq!(service.payable_balance(PASSENGER).await.unwrap(), milli_ether(150));
        assert_eq!(service.withdraw(PASSENGER).await.unwrap(), milli_ether(150));

        let names = service.publisher().names();
        assert_eq!(names.first(), Some(&"AirlineFunded"));
        assert_eq!(names.last(), Some(&"PayoutWithdrawn"));
        let position = |name| names.iter().position(|n| *n == name).unwrap();
        assert!(position("FlightStatusInfo") < position("PolicyCredited"));
    }

    #[tokio::test]
    async fn test_concurrent_responses_finalize_once() {
        let bus = Arc::new(InMemoryEventBus::new());
        let ledger = Ledger::new(
            LedgerConfig::default(),
            ScriptedEntropy::constant(2),
            OWNER,
            FIRST,
        );
        let service = Arc::new(FlightSuretyService::new(ledger, bus.clone()));

        service.pay_airline_dues(FIRST, ether(10)).await.unwrap();
        let key = service
            .register_flight(FIRST, "ND1309".to_string(), 1)
            .await
            .unwrap();
        for n in 1..=6 {
            service.register_oracle(oracle(n), ether(1)).await.unwrap();
        }
        service.fetch_flight_status(PASSENGER, key.clone()).await.unwrap();

        let mut handles = Vec::new();
        for n in 1..=6 {
            let service = service.clone();
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                service
                    .submit_oracle_response(oracle(n), 2, key, FlightStatus::OnTime.code())
                    .await
            }));
        }
        let mut finalized = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().finalized.is_some() {
                finalized += 1;
            }
        }
        assert_eq!(finalized, 1);

        let infos = bus.replay(&EventFilter::topics(vec![EventTopic::Flights]));
        let status_infos: Vec<_> = infos
            .iter()
            .filter(|e| matches!(e.event, LedgerEvent::FlightStatusInfo { .. }))
            .collect();
        assert_eq!(status_infos.len(), 1);

        // Journal sequences are contiguous in commit order
        let all = bus.replay(&EventFilter::all());
        assert!(all.iter().enumerate().all(|(i, e)| e.sequence == i as u64));
    }
}
