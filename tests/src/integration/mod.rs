//! # Integration Tests
//!
//! Cross-crate choreography: negotiation driving the settlement bridge,
//! expiry sweeps under a shared clock, transition races, and bus delivery.

pub mod bus_delivery;
pub mod concurrency;
pub mod expiry;
pub mod negotiation_flow;
pub mod settlement_flow;
