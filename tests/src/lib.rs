//! # Flight Surety Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Ledger throughput
//! └── src/integration/  # Cross-crate flows over the event bus
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p surety-tests
//! cargo bench -p surety-tests
//! ```

pub mod integration;
