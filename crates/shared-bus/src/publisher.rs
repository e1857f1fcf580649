//! # Event Publisher
//!
//! Defines the publishing side of the event bus.

use crate::events::{EventFilter, EventTopic, LedgerEvent};
use crate::journal::{EventJournal, JournalEntry};
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Trait for publishing events to the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event and return its journal sequence number.
    async fn publish(&self, event: LedgerEvent) -> u64;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;
}

/// In-memory implementation of the event bus.
///
/// Every event is written to the journal first, then fanned out through a
/// `tokio::sync::broadcast` channel to live subscribers.
pub struct InMemoryEventBus {
    /// Durable (for the process lifetime) record of every event.
    journal: Arc<EventJournal>,

    /// Broadcast sender for live entries.
    sender: broadcast::Sender<JournalEntry>,

    /// Total events published.
    events_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a new in-memory event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory event bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            journal: Arc::new(EventJournal::new()),
            sender,
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to events matching a filter.
    ///
    /// Entries already in the journal at or after `filter.from_sequence` are
    /// replayed first; live entries follow without gaps or duplicates.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        // Receiver before backlog: anything appended in between shows up in
        // both and is dropped by the subscription's sequence check.
        let receiver = self.sender.subscribe();
        let (backlog, head) = self.journal.read_to_head(&filter);

        debug!(
            topics = ?filter.topics,
            from = filter.from_sequence,
            replayed = backlog.len(),
            "New subscription created"
        );

        Subscription::new(
            receiver,
            filter,
            backlog,
            head,
            self.journal.clone(),
        )
    }

    /// Subscribe to events published from now on.
    #[must_use]
    pub fn subscribe_live(&self, topics: Vec<EventTopic>) -> Subscription {
        self.subscribe(EventFilter::topics(topics).since(self.journal.head()))
    }

    /// Read the journal without subscribing.
    #[must_use]
    pub fn replay(&self, filter: &EventFilter) -> Vec<JournalEntry> {
        self.journal.read(filter)
    }

    /// Sequence number the next event will receive.
    #[must_use]
    pub fn head(&self) -> u64 {
        self.journal.head()
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Shared handle to the underlying journal.
    #[must_use]
    pub fn journal(&self) -> Arc<EventJournal> {
        self.journal.clone()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: LedgerEvent) -> u64 {
        let topic = event.topic();
        let name = event.name();

        self.events_published.fetch_add(1, Ordering::Relaxed);

        let entry = self.journal.append_with(event, |entry| {
            // No live receivers is fine: the journal keeps the entry.
            let receivers = self.sender.send(entry.clone()).unwrap_or(0);
            debug!(
                topic = ?topic,
                event = name,
                sequence = entry.sequence,
                receivers,
                "Event published"
            );
        });
        entry.sequence
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Address;

    fn event(amount: u128) -> LedgerEvent {
        LedgerEvent::PayoutWithdrawn {
            passenger: Address::from_low_u8(3),
            amount,
        }
    }

    #[tokio::test]
    async fn test_publish_no_subscribers() {
        let bus = InMemoryEventBus::new();

        let sequence = bus.publish(event(1)).await;
        assert_eq!(sequence, 0);
        assert_eq!(bus.events_published(), 1);
        assert_eq!(bus.head(), 1);
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = InMemoryEventBus::new();

        let _sub1 = bus.subscribe(EventFilter::all());
        let _sub2 = bus.subscribe(EventFilter::all());
        let _sub3 = bus.subscribe(EventFilter::topics(vec![EventTopic::Oracles]));

        bus.publish(event(1)).await;
        assert_eq!(bus.subscriber_count(), 3);
    }

    #[tokio::test]
    async fn test_replay_reads_journal() {
        let bus = InMemoryEventBus::new();
        bus.publish(event(1)).await;
        bus.publish(event(2)).await;

        let entries = bus.replay(&EventFilter::all().since(1));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, event(2));
    }

    #[test]
    fn test_default_bus() {
        let bus = InMemoryEventBus::default();
        assert_eq!(bus.capacity(), DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.events_published(), 0);
    }
}
