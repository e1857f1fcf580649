//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits.

mod entropy;
mod publisher;

pub use entropy::{KeccakEntropy, ScriptedEntropy};
pub use publisher::RecordingPublisher;
