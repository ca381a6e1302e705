//! # Offer Negotiation Engine
//!
//! State machine for price negotiation on Sourcemart listings.
//!
//! A buyer opens a *root offer* below a project's listed price. The parties
//! then alternate counter-offers, forming a singly-linked chain, until one
//! side accepts, rejects, or withdraws, or the pending node expires. Accepting
//! hands off to the settlement bridge, which places the agreed amount in
//! escrow.
//!
//! ## Module Structure
//!
//! ```text
//! offer-negotiation/
//! ├── domain/     # Offer entity, status machine, roles, config, errors
//! ├── ports/      # NegotiationApi (inbound), store/catalog/clock (outbound)
//! ├── adapters/   # In-memory conditional-update offer store
//! └── service/    # Engine implementation
//! ```
//!
//! ## Concurrency Model
//!
//! Every transition is a single conditional update against the offer's
//! current status. Two actors racing on the same node produce exactly one
//! winner; the loser observes a stale-status validation error. Counter-offers
//! perform their two writes (parent to `Countered`, child inserted `Pending`)
//! as one atomic store call. Audit and notification events are published
//! after the transition commits and are never allowed to fail it.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::InMemoryOfferStore;
pub use domain::{
    NegotiationConfig, NegotiationError, Offer, OfferStatus, Party, PermissionError,
    RootOfferParams, ValidationError,
};
pub use ports::{
    GatewayError, LookupError, ManualClock, NegotiationApi, OfferDetails, OfferScope,
    InMemoryProjectCatalog, InMemoryUserDirectory, OfferStore, ProjectCatalog,
    RecordingSettlementGateway, SettlementGateway, StoreError, SweepReport, SystemTimeSource,
    TimeSource, UserDirectory,
};
pub use service::NegotiationService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
