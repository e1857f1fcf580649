//! # Integration Tests
//!
//! End-to-end flows: service, event bus, journal replay and oracle simulator.

pub mod flows;
