//! # Domain Errors
//!
//! The caller-facing error taxonomy: validation failures the user can
//! correct, permission failures for the wrong actor, not-found for absent
//! resources, and an opaque internal bucket for persistence faults.

use super::value_objects::OfferStatus;
use marketplace_types::{Cents, OfferId, ProjectId};
use thiserror::Error;

/// Precondition failures the caller can correct.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The offered price is below the applicable floor (the platform
    /// minimum or the listing's own minimum, whichever is higher).
    #[error("offered price {offered_cents} is below the minimum {minimum_cents}")]
    PriceBelowMinimum {
        /// What was offered.
        offered_cents: Cents,
        /// The effective floor.
        minimum_cents: Cents,
    },

    /// Offers must come in strictly below the chain's price ceiling.
    #[error("offered price {offered_cents} must be below the listed price {ceiling_cents}")]
    PriceNotBelowListing {
        /// What was offered.
        offered_cents: Cents,
        /// The listed price (root) or the chain's immutable ceiling (counter).
        ceiling_cents: Cents,
    },

    /// The project is not accepting offers.
    #[error("project is not open to offers")]
    ProjectNotSellable,

    /// The buyer already has an active negotiation on this project.
    #[error("an active offer already exists on this project: {existing}")]
    DuplicateActiveOffer {
        /// The root offer occupying the slot.
        existing: OfferId,
    },

    /// The offer is no longer in the status the operation requires. This is
    /// also what the loser of a transition race observes.
    #[error("offer is {actual:?}, expected {expected:?}")]
    StaleStatus {
        /// Status the operation required.
        expected: OfferStatus,
        /// Status actually found.
        actual: OfferStatus,
    },

    /// The attached message exceeds the configured maximum.
    #[error("message is {length} chars, maximum is {max}")]
    MessageTooLong {
        /// Actual length in chars.
        length: usize,
        /// Configured maximum.
        max: usize,
    },
}

/// The actor is not allowed to perform the requested transition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PermissionError {
    /// Sellers cannot open offers on their own listings.
    #[error("cannot make an offer on your own project")]
    BuyerIsSeller,

    /// Counter, accept, and reject belong to the node's recipient.
    #[error("only the recipient of this offer may respond to it")]
    NotRecipient,

    /// Withdraw belongs to the node's proposer.
    #[error("only the proposer of this offer may withdraw it")]
    NotProposer,

    /// Listing a project's offers belongs to the project owner.
    #[error("only the project owner may list a project's offers")]
    NotProjectOwner,
}

/// Top-level error for every negotiation operation.
#[derive(Debug, Error)]
pub enum NegotiationError {
    /// The offer does not exist, or the caller is not a party to it and
    /// must not learn that it exists.
    #[error("offer not found: {0}")]
    OfferNotFound(OfferId),

    /// The project does not exist.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// A user-correctable precondition failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The actor may not perform this transition.
    #[error(transparent)]
    Permission(#[from] PermissionError),

    /// A persistence or collaborator fault. Full context is logged; the
    /// caller decides whether to retry.
    #[error("internal error: {0}")]
    Internal(String),
}

impl NegotiationError {
    /// Whether this error is user-correctable.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
