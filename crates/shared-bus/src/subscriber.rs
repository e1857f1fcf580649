//! # Event Subscriber
//!
//! Cursor-based subscriptions: replay the journal, then follow live events.

use crate::events::EventFilter;
use crate::journal::{EventJournal, JournalEntry};
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The event bus was closed.
    #[error("Event bus closed")]
    Closed,
}

/// A subscription handle for receiving journal entries in sequence order.
///
/// Dropping it releases its broadcast receiver, which is what
/// [`InMemoryEventBus::subscriber_count`](crate::InMemoryEventBus::subscriber_count) counts.
pub struct Subscription {
    /// The broadcast receiver for live entries.
    receiver: broadcast::Receiver<JournalEntry>,

    /// Filter for this subscription.
    filter: EventFilter,

    /// Entries replayed from the journal, delivered before live ones.
    backlog: VecDeque<JournalEntry>,

    /// Journal used to refill after lagging.
    journal: Arc<EventJournal>,

    /// Next sequence this subscription has not yet seen.
    cursor: u64,
}

impl Subscription {
    pub(crate) fn new(
        receiver: broadcast::Receiver<JournalEntry>,
        filter: EventFilter,
        backlog: Vec<JournalEntry>,
        head: u64,
        journal: Arc<EventJournal>,
    ) -> Self {
        // The backlog read covered everything below `head`, including
        // entries the topic filter skipped.
        let cursor = head.max(filter.from_sequence);
        Self {
            receiver,
            filter,
            backlog: backlog.into(),
            journal,
            cursor,
        }
    }

    /// Receive the next entry that matches the filter.
    ///
    /// # Returns
    ///
    /// - `Some(entry)` - The next matching entry
    /// - `None` - The channel was closed (bus dropped)
    pub async fn recv(&mut self) -> Option<JournalEntry> {
        loop {
            if let Some(entry) = self.backlog.pop_front() {
                return Some(entry);
            }

            let entry = match self.receiver.recv().await {
                Ok(e) => e,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, cursor = self.cursor, "Subscriber lagged, refilling from journal");
                    self.refill();
                    continue;
                }
            };

            if let Some(entry) = self.accept(entry) {
                return Some(entry);
            }
        }
    }

    /// Try to receive the next entry without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(entry))` - An entry was available and matched
    /// - `Ok(None)` - No entry available (would block)
    /// - `Err(SubscriptionError::Closed)` - The channel was closed
    pub fn try_recv(&mut self) -> Result<Option<JournalEntry>, SubscriptionError> {
        loop {
            if let Some(entry) = self.backlog.pop_front() {
                return Ok(Some(entry));
            }

            let entry = match self.receiver.try_recv() {
                Ok(e) => e,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => {
                    self.refill();
                    continue;
                }
            };

            if let Some(entry) = self.accept(entry) {
                return Ok(Some(entry));
            }
        }
    }

    /// Drain everything currently available without blocking.
    pub fn drain(&mut self) -> Result<Vec<JournalEntry>, SubscriptionError> {
        let mut out = Vec::new();
        while let Some(entry) = self.try_recv()? {
            out.push(entry);
        }
        Ok(out)
    }

    /// Next sequence number this subscription will look at.
    #[must_use]
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Drop duplicates and advance the cursor.
    fn accept(&mut self, entry: JournalEntry) -> Option<JournalEntry> {
        if entry.sequence < self.cursor {
            return None;
        }
        self.cursor = entry.sequence + 1;
        self.filter.matches(&entry).then_some(entry)
    }

    fn refill(&mut self) {
        let (missed, head) = self
            .journal
            .read_to_head(&self.filter.clone().since(self.cursor));
        self.cursor = head.max(self.cursor);
        self.backlog.extend(missed);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        debug!(topics = ?self.filter.topics, cursor = self.cursor, "Subscription dropped");
    }
}
