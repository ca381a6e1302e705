//! # Domain Layer
//!
//! Entities, value objects, configuration, and errors for offer negotiation.
//! Everything here is pure: no I/O, no clocks, no stores.

pub mod config;
pub mod entities;
pub mod errors;
pub mod value_objects;

pub use config::NegotiationConfig;
pub use entities::{Offer, RootOfferParams};
pub use errors::{NegotiationError, PermissionError, ValidationError};
pub use value_objects::{proposer_at_depth, recipient_at_depth, OfferStatus, Party};
