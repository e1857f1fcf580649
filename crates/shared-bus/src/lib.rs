//! # Shared Bus - Ledger Event Journal
//!
//! Notifications emitted by the ledger after each committed transaction.
//!
//! ## Delivery Rules
//!
//! - Every event is appended to an append-only [`EventJournal`] and receives a
//!   monotonically increasing sequence number.
//! - Consumers read through a cursor: a [`Subscription`] opened "from sequence
//!   N" first replays the journal from N, then follows live events without gaps
//!   or duplicates.
//! - A subscriber that lags behind the live channel is refilled from the
//!   journal, so a slow oracle process never misses a request.
//!
//! ```text
//! ┌──────────────┐   publish()   ┌──────────────┐   replay + follow   ┌──────────────┐
//! │    Ledger    │ ────────────→ │   Journal    │ ──────────────────→ │   Oracles    │
//! │   (commit)   │               │ seq 0..head  │                     │   / UI       │
//! └──────────────┘               └──────────────┘                     └──────────────┘
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod journal;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, LedgerEvent};
pub use journal::{EventJournal, JournalEntry};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum live events buffered per subscriber before it is refilled from the journal.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
