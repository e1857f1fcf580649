//! Driven Ports (SPI - Outbound Dependencies)

use shared_types::Address;

pub use shared_bus::EventPublisher;

/// Source of index randomness for oracle assignment and request routing.
///
/// Implementations must be deterministic in `(nonce, account)`: the nonce is
/// part of ledger state and rolls back with a failed transaction, so the same
/// inputs must yield the same digest on replay.
pub trait EntropySource: Send + Sync {
    /// 32 pseudo-random bytes for `account` at `nonce`.
    fn digest(&self, nonce: u64, account: &Address) -> [u8; 32];
}
