//! # Integration Test Flows
//!
//! Tests that the ledger service, the shared-bus journal and the oracle
//! simulator work together.
//!
//! ## Flows Tested:
//!
//! 1. **Airline onboarding**: bootstrap registrations, then consensus votes
//! 2. **Delayed flight**: purchase → request → quorum → credit → withdrawal
//! 3. **Journal replay**: a late oracle process still sees earlier requests
//! 4. **Simulated oracles**: random reports until the flight resolves

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    use shared_bus::{EventFilter, EventTopic, InMemoryEventBus, LedgerEvent};
    use shared_types::{ether, milli_ether, Address, AirlineState, FlightKey, FlightStatus};
    use surety_ledger::adapters::{KeccakEntropy, ScriptedEntropy};
    use surety_ledger::{
        EntropySource, FlightSuretyApi, FlightSuretyService, Ledger, LedgerConfig, LedgerError,
        PolicyState,
    };
    use surety_node::OracleSimulator;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const OWNER: Address = Address::from_low_u8(1);
    const FIRST: Address = Address::from_low_u8(10);
    const PASSENGER: Address = Address::from_low_u8(50);

    fn airline(n: u8) -> Address {
        Address::from_low_u8(10 + n)
    }

    fn oracle(n: u8) -> Address {
        Address::from_low_u8(100 + n)
    }

    fn create_service<E: EntropySource + 'static>(
        entropy: E,
    ) -> (
        Arc<FlightSuretyService<E, InMemoryEventBus>>,
        Arc<InMemoryEventBus>,
    ) {
        let bus = Arc::new(InMemoryEventBus::new());
        let ledger = Ledger::new(LedgerConfig::default(), entropy, OWNER, FIRST);
        let service = Arc::new(FlightSuretyService::new(ledger, bus.clone()));
        (service, bus)
    }

    async fn funded_flight<E: EntropySource + 'static>(
        service: &FlightSuretyService<E, InMemoryEventBus>,
    ) -> FlightKey {
        service.pay_airline_dues(FIRST, ether(10)).await.unwrap();
        service
            .register_flight(FIRST, "ND1309".to_string(), 1_700_000_000)
            .await
            .unwrap()
    }

    fn event_names(bus: &InMemoryEventBus) -> Vec<&'static str> {
        bus.replay(&EventFilter::all())
            .iter()
            .map(|entry| entry.event.name())
            .collect()
    }

    // =============================================================================
    // AIRLINE ONBOARDING
    // =============================================================================

    #[tokio::test]
    async fn test_fifth_airline_needs_half_of_participants() {
        let (service, bus) = create_service(ScriptedEntropy::constant(0));
        service.pay_airline_dues(FIRST, ether(10)).await.unwrap();

        for n in 1..=3 {
            let state = service.register_airline(FIRST, airline(n)).await.unwrap();
            assert_eq!(state, AirlineState::Registered);
        }
        assert_eq!(service.number_of_airlines().await, 4);

        // Fifth airline applies; the sponsor's registration is not a vote
        let state = service.register_airline(FIRST, airline(4)).await.unwrap();
        assert_eq!(state, AirlineState::Applied);
        assert_eq!(service.approvals_count(airline(4)).await, 0);

        // Registered-but-unfunded airlines cannot vote
        let err = service.approve_airline(airline(1), airline(4)).await.unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized { .. }));

        let outcome = service.approve_airline(FIRST, airline(4)).await.unwrap();
        assert_eq!((outcome.approvals, outcome.required), (1, 2));
        assert!(!outcome.registered);

        let err = service.approve_airline(FIRST, airline(4)).await.unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateVote { .. }));

        service.pay_airline_dues(airline(1), ether(10)).await.unwrap();
        let outcome = service.approve_airline(airline(1), airline(4)).await.unwrap();
        assert!(outcome.registered);
        assert_eq!(service.airline_state(airline(4)).await, Some(AirlineState::Registered));

        service.pay_airline_dues(airline(4), ether(10)).await.unwrap();
        assert_eq!(service.airline_state(airline(4)).await, Some(AirlineState::Funded));
        assert_eq!(service.number_of_airlines().await, 5);

        let airlines = bus.replay(&EventFilter::topics(vec![EventTopic::Airlines]));
        let registered: Vec<Address> = airlines
            .iter()
            .filter_map(|entry| match entry.event {
                LedgerEvent::AirlineRegistered { airline, .. } => Some(airline),
                _ => None,
            })
            .collect();
        assert_eq!(registered, vec![airline(1), airline(2), airline(3), airline(4)]);
    }

    // =============================================================================
    // INSURANCE LIFECYCLE
    // =============================================================================

    #[tokio::test]
    async fn test_delayed_flight_pays_one_and_a_half() {
        let (service, bus) = create_service(ScriptedEntropy::constant(4));
        let key = funded_flight(&service).await;

        for n in 1..=3 {
            service.register_oracle(oracle(n), ether(1)).await.unwrap();
        }
        service
            .purchase_insurance(PASSENGER, key.clone(), ether(1), ether(1))
            .await
            .unwrap();
        assert_eq!(service.ledger_balance().await, ether(14));

        let index = service.fetch_flight_status(PASSENGER, key.clone()).await.unwrap();
        assert_eq!(index, 4);

        let mut credited = 0;
        for n in 1..=3 {
            let outcome = service
                .submit_oracle_response(oracle(n), index, key.clone(), 20)
                .await
                .unwrap();
            credited += outcome.credited;
        }
        assert_eq!(credited, 1);

        let flight = service.flight_by_key(key.clone()).await.unwrap();
        assert_eq!(flight.status, FlightStatus::LateAirline);
        assert_eq!(service.payable_balance(PASSENGER).await.unwrap(), milli_ether(1500));

        assert_eq!(service.withdraw(PASSENGER).await.unwrap(), milli_ether(1500));
        assert_eq!(service.ledger_balance().await, milli_ether(12_500));
        let err = service.withdraw(PASSENGER).await.unwrap_err();
        assert!(matches!(err, LedgerError::NothingToWithdraw { .. }));

        let policy = service.policy(PASSENGER, key).await.unwrap();
        assert_eq!(policy.state, PolicyState::Withdrawn);

        let names = event_names(&bus);
        let tail: Vec<_> = names.iter().rev().take(3).rev().copied().collect();
        assert_eq!(tail, vec!["FlightStatusInfo", "PolicyCredited", "PayoutWithdrawn"]);
    }

    #[tokio::test]
    async fn test_weather_delay_credits_nothing() {
        let (service, _bus) = create_service(ScriptedEntropy::constant(7));
        let key = funded_flight(&service).await;
        for n in 1..=3 {
            service.register_oracle(oracle(n), ether(1)).await.unwrap();
        }
        service
            .purchase_insurance(PASSENGER, key.clone(), milli_ether(500), milli_ether(500))
            .await
            .unwrap();

        let index = service.fetch_flight_status(PASSENGER, key.clone()).await.unwrap();
        for n in 1..=3 {
            service
                .submit_oracle_response(oracle(n), index, key.clone(), FlightStatus::LateWeather.code())
                .await
                .unwrap();
        }

        assert_eq!(service.payable_balance(PASSENGER).await.unwrap(), 0);
        // Flight is resolved; no new cover and no new requests
        let err = service
            .purchase_insurance(Address::from_low_u8(51), key.clone(), 1, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidState { .. }));
        let err = service.fetch_flight_status(PASSENGER, key).await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_rejections_never_reach_the_journal() {
        let (service, bus) = create_service(ScriptedEntropy::constant(1));
        let key = funded_flight(&service).await;
        let head = bus.head();

        assert!(service.set_operating_status(PASSENGER, false).await.is_err());
        assert!(service
            .purchase_insurance(PASSENGER, key.clone(), ether(2), ether(2))
            .await
            .is_err());
        assert!(service.register_oracle(oracle(1), milli_ether(999)).await.is_err());
        assert!(service
            .submit_oracle_response(oracle(1), 1, key, 10)
            .await
            .is_err());

        assert_eq!(bus.head(), head);
        assert_eq!(service.ledger_balance().await, ether(10));
    }

    #[tokio::test]
    async fn test_paused_ledger_blocks_writes_not_reads() {
        let (service, bus) = create_service(ScriptedEntropy::constant(1));
        let key = funded_flight(&service).await;

        assert!(service.set_operating_status(OWNER, false).await.unwrap());
        let err = service
            .purchase_insurance(PASSENGER, key.clone(), 1, 1)
            .await
            .unwrap_err();
        assert_eq!(err, LedgerError::NotOperational);
        assert!(service.flight_by_key(key.clone()).await.is_some());
        assert_eq!(service.flights_count().await, 1);

        // Setting the same value again changes nothing
        assert!(!service.set_operating_status(OWNER, false).await.unwrap());
        assert!(service.set_operating_status(OWNER, true).await.unwrap());
        service
            .purchase_insurance(PASSENGER, key, 1, 1)
            .await
            .unwrap();

        let toggles = bus
            .replay(&EventFilter::topics(vec![EventTopic::Governance]))
            .len();
        assert_eq!(toggles, 2);
    }

    // =============================================================================
    // ORACLE PROCESS
    // =============================================================================

    #[tokio::test]
    async fn test_late_subscriber_sees_earlier_requests() {
        let (service, bus) = create_service(ScriptedEntropy::new(vec![2, 5]));
        let key = funded_flight(&service).await;

        let first = service.fetch_flight_status(PASSENGER, key.clone()).await.unwrap();

        // Oracle process comes up after the first request
        let mut subscription = bus.subscribe(EventFilter::topics(vec![EventTopic::Oracles]));
        let second = service.fetch_flight_status(PASSENGER, key.clone()).await.unwrap();

        let mut indexes = Vec::new();
        for _ in 0..2 {
            let entry = timeout(Duration::from_millis(100), subscription.recv())
                .await
                .expect("timeout")
                .expect("entry");
            if let LedgerEvent::OracleRequest { index, key: seen, .. } = entry.event {
                assert_eq!(seen, key);
                indexes.push(index);
            }
        }
        assert_eq!(indexes, vec![first, second]);
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_simulated_oracles_resolve_flight() {
        let bus = Arc::new(InMemoryEventBus::new());
        let ledger = Ledger::new(LedgerConfig::default(), KeccakEntropy::new(7), OWNER, FIRST);
        let service = Arc::new(FlightSuretyService::new(ledger, bus.clone()));
        let key = funded_flight(&service).await;
        service
            .purchase_insurance(PASSENGER, key.clone(), milli_ether(100), milli_ether(100))
            .await
            .unwrap();

        let mut simulator = OracleSimulator::seeded(service.clone(), 42);
        simulator.register_oracles(60, ether(1)).await.unwrap();

        let mut attempts = 0;
        while !service.flight_by_key(key.clone()).await.unwrap().is_finalized() {
            attempts += 1;
            assert!(attempts <= 50, "flight never resolved");
            let index = service
                .fetch_flight_status(PASSENGER, key.clone())
                .await
                .unwrap();
            simulator.answer(index, &key).await;
        }

        let flight = service.flight_by_key(key.clone()).await.unwrap();
        let payable = service.payable_balance(PASSENGER).await.unwrap();
        if flight.status.is_airline_fault() {
            assert_eq!(payable, milli_ether(150));
        } else {
            assert_eq!(payable, 0);
        }

        let infos: Vec<FlightStatus> = bus
            .replay(&EventFilter::topics(vec![EventTopic::Flights]))
            .into_iter()
            .filter_map(|entry| match entry.event {
                LedgerEvent::FlightStatusInfo { status, .. } => Some(status),
                _ => None,
            })
            .collect();
        assert_eq!(infos, vec![flight.status]);
    }
}
