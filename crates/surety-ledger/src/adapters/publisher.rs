//! Recording publisher
//!
//! Keeps every published event in memory. Used where a full bus with
//! subscriptions is not needed.

use crate::ports::outbound::EventPublisher;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_bus::LedgerEvent;

#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<LedgerEvent>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far.
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.events.lock().clone()
    }

    /// Event names in publish order.
    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(LedgerEvent::name).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: LedgerEvent) -> u64 {
        let mut events = self.events.lock();
        events.push(event);
        events.len() as u64 - 1
    }

    fn events_published(&self) -> u64 {
        self.events.lock().len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Address;

    #[tokio::test]
    async fn test_records_in_order() {
        let publisher = RecordingPublisher::new();
        let first = publisher
            .publish(LedgerEvent::OperationalStatusChanged {
                operational: false,
                changed_by: Address::from_low_u8(1),
            })
            .await;
        let second = publisher
            .publish(LedgerEvent::PayoutWithdrawn {
                passenger: Address::from_low_u8(2),
                amount: 3,
            })
            .await;

        assert_eq!((first, second), (0, 1));
        assert_eq!(publisher.names(), vec!["OperationalStatusChanged", "PayoutWithdrawn"]);
        assert_eq!(publisher.events_published(), 2);

        publisher.clear();
        assert!(publisher.events().is_empty());
    }
}
