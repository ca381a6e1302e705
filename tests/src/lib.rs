//! # Sourcemart Test Suite
//!
//! Unified test crate exercising the marketplace crates together: the
//! negotiation engine wired to the real settlement bridge over the shared
//! event bus.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Fully-wired marketplace fixture
//! └── integration/      # Cross-crate choreography
//!     ├── negotiation_flow.rs
//!     ├── expiry.rs
//!     ├── settlement_flow.rs
//!     ├── concurrency.rs
//!     └── bus_delivery.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p marketplace-tests
//!
//! # By category
//! cargo test -p marketplace-tests integration::negotiation_flow
//! cargo test -p marketplace-tests integration::concurrency
//! ```

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
pub mod support;
