//! # Event Journal
//!
//! Append-only, in-memory log of committed ledger events.
//!
//! Sequence numbers start at 0 and never skip. Entries are never removed, so
//! any consumer can replay from any cursor.

use crate::events::{EventFilter, LedgerEvent};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// One event with its position in the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Position in the journal.
    pub sequence: u64,
    /// The event.
    pub event: LedgerEvent,
}

/// Append-only event log.
#[derive(Debug, Default)]
pub struct EventJournal {
    entries: RwLock<Vec<JournalEntry>>,
}

impl EventJournal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return its entry.
    pub fn append(&self, event: LedgerEvent) -> JournalEntry {
        self.append_with(event, |_| {})
    }

    /// Append an event and run `on_append` while the write lock is still held.
    ///
    /// Used by the bus to fan out live entries in sequence order.
    pub fn append_with<F>(&self, event: LedgerEvent, on_append: F) -> JournalEntry
    where
        F: FnOnce(&JournalEntry),
    {
        let mut entries = self.entries.write();
        let entry = JournalEntry {
            sequence: entries.len() as u64,
            event,
        };
        entries.push(entry.clone());
        on_append(&entry);
        entry
    }

    /// All entries matching `filter`, in sequence order.
    #[must_use]
    pub fn read(&self, filter: &EventFilter) -> Vec<JournalEntry> {
        self.read_to_head(filter).0
    }

    /// Matching entries plus the head they were read against, under one lock.
    #[must_use]
    pub fn read_to_head(&self, filter: &EventFilter) -> (Vec<JournalEntry>, u64) {
        let entries = self.entries.read();
        let start = usize::try_from(filter.from_sequence)
            .unwrap_or(usize::MAX)
            .min(entries.len());
        let matching = entries[start..]
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect();
        (matching, entries.len() as u64)
    }

    /// Sequence number the next appended entry will receive.
    #[must_use]
    pub fn head(&self) -> u64 {
        self.entries.read().len() as u64
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
