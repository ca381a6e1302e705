//! # Ports
//!
//! Inbound: the `NegotiationApi` trait callers drive.
//! Outbound: the collaborator traits the engine requires the host to bind
//! (offer store, project catalog, user directory, settlement gateway, clock).

pub mod inbound;
pub mod outbound;

pub use inbound::{NegotiationApi, OfferDetails, OfferScope, SweepReport};
pub use outbound::{
    GatewayError, InMemoryProjectCatalog, InMemoryUserDirectory, LookupError, ManualClock,
    OfferStore, ProjectCatalog, RecordingSettlementGateway, SettlementGateway, StoreError,
    SystemTimeSource, TimeSource, UserDirectory,
};
