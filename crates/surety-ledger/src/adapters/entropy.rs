//! Entropy adapters
//!
//! `KeccakEntropy` hashes `seed ‖ nonce ‖ account`. It is hard for a single
//! oracle to game but makes no cryptographic unpredictability claim.
//! `ScriptedEntropy` replays fixed indexes for tests and simulations.

use crate::ports::outbound::EntropySource;
use sha3::{Digest, Keccak256};
use shared_types::Address;

/// Keccak-256 based entropy with an explicit seed.
#[derive(Clone, Debug, Default)]
pub struct KeccakEntropy {
    seed: u64,
}

impl KeccakEntropy {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl EntropySource for KeccakEntropy {
    fn digest(&self, nonce: u64, account: &Address) -> [u8; 32] {
        let mut hasher = Keccak256::new();
        hasher.update(self.seed.to_be_bytes());
        hasher.update(nonce.to_be_bytes());
        hasher.update(account.as_bytes());
        hasher.finalize().into()
    }
}

/// Yields `values[nonce % len]` as the drawn value.
///
/// Keyed by nonce, so a rolled-back transaction replays the same value.
#[derive(Clone, Debug, Default)]
pub struct ScriptedEntropy {
    values: Vec<u8>,
}

impl ScriptedEntropy {
    pub fn new(values: impl Into<Vec<u8>>) -> Self {
        Self {
            values: values.into(),
        }
    }

    /// Every draw yields `value`.
    pub fn constant(value: u8) -> Self {
        Self::new(vec![value])
    }
}

impl EntropySource for ScriptedEntropy {
    fn digest(&self, nonce: u64, _account: &Address) -> [u8; 32] {
        let mut digest = [0u8; 32];
        if !self.values.is_empty() {
            let slot = (nonce % self.values.len() as u64) as usize;
            digest[31] = self.values[slot];
        }
        digest
    }
}
