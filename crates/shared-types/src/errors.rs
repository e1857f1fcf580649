//! # Error Types
//!
//! Parsing errors for the shared primitives.

use thiserror::Error;

/// Errors raised while decoding shared primitives from external input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// Address string is not 20 hex-encoded bytes.
    #[error("Invalid address '{input}': expected 40 hex characters with optional 0x prefix")]
    InvalidAddress { input: String },

    /// Numeric status code outside the known set.
    #[error("Unknown flight status code: {0}")]
    UnknownStatusCode(u8),

    /// Numeric airline state outside the known set.
    #[error("Unknown airline state code: {0}")]
    UnknownAirlineState(u8),
}
