//! # Domain Entities
//!
//! The offer: one node in a negotiation chain.

use super::value_objects::{OfferStatus, Party};
use marketplace_types::{Cents, OfferId, ProjectId, Timestamp, TransactionId, UserId};
use serde::{Deserialize, Serialize};

/// One node in a negotiation chain.
///
/// A chain is singly linked through `parent_offer_id`; each node has at most
/// one direct child (the counter produced in response to it). Rows are never
/// deleted: terminal nodes are retained for audit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    /// Unique, monotonically-sortable identifier (UUIDv7).
    pub id: OfferId,
    /// The project under negotiation.
    pub project_id: ProjectId,
    /// The buying party. Constant along the whole chain.
    pub buyer_id: UserId,
    /// The selling party, derived from the project at root creation.
    pub seller_id: UserId,
    /// The offer this node counters; `None` for a root offer.
    pub parent_offer_id: Option<OfferId>,
    /// The escrow transaction, set only once settlement has begun.
    pub transaction_id: Option<TransactionId>,
    /// The price proposed at this node, in cents.
    pub offered_price_cents: Cents,
    /// The project's listed price when the root offer was created.
    /// Immutable ceiling for every node in the chain.
    pub original_price_cents: Cents,
    /// Current lifecycle status.
    pub status: OfferStatus,
    /// Optional note from the proposer.
    pub message: Option<String>,
    /// Creation time. Immutable.
    pub created_at: Timestamp,
    /// Deadline: past this instant the node is sweep-eligible.
    pub expires_at: Timestamp,
    /// Set exactly once, on the transition out of `Pending`.
    pub responded_at: Option<Timestamp>,
}

/// Parameters for creating a root offer.
#[derive(Clone, Debug)]
pub struct RootOfferParams {
    /// The project being offered on.
    pub project_id: ProjectId,
    /// The buyer opening the negotiation.
    pub buyer_id: UserId,
    /// The project's owner.
    pub seller_id: UserId,
    /// The buyer's proposed price in cents.
    pub offered_price_cents: Cents,
    /// Snapshot of the project's listed price in cents.
    pub original_price_cents: Cents,
    /// Optional note to the seller.
    pub message: Option<String>,
    /// Creation time.
    pub created_at: Timestamp,
    /// Response deadline.
    pub expires_at: Timestamp,
}

impl Offer {
    /// Create a root offer (chain depth 0, buyer-proposed).
    #[must_use]
    pub fn root(params: RootOfferParams) -> Self {
        Self {
            id: OfferId::generate(),
            project_id: params.project_id,
            buyer_id: params.buyer_id,
            seller_id: params.seller_id,
            parent_offer_id: None,
            transaction_id: None,
            offered_price_cents: params.offered_price_cents,
            original_price_cents: params.original_price_cents,
            status: OfferStatus::Pending,
            message: params.message,
            created_at: params.created_at,
            expires_at: params.expires_at,
            responded_at: None,
        }
    }

    /// Create the counter-offer child of `parent`.
    ///
    /// Inherits the project, parties, and price ceiling; links back through
    /// `parent_offer_id`. Roles swap implicitly because the child sits one
    /// level deeper in the chain.
    #[must_use]
    pub fn counter_of(
        parent: &Offer,
        counter_price_cents: Cents,
        message: Option<String>,
        created_at: Timestamp,
        expires_at: Timestamp,
    ) -> Self {
        Self {
            id: OfferId::generate(),
            project_id: parent.project_id,
            buyer_id: parent.buyer_id,
            seller_id: parent.seller_id,
            parent_offer_id: Some(parent.id),
            transaction_id: None,
            offered_price_cents: counter_price_cents,
            original_price_cents: parent.original_price_cents,
            status: OfferStatus::Pending,
            message,
            created_at,
            expires_at,
            responded_at: None,
        }
    }

    /// Whether this node is a root offer.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_offer_id.is_none()
    }

    /// Whether this node still occupies the buyer's negotiation slot.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Whether the deadline has strictly passed.
    #[must_use]
    pub fn is_past_due(&self, now: Timestamp) -> bool {
        self.expires_at < now
    }

    /// Whether the sweep may expire this node right now.
    #[must_use]
    pub fn is_sweep_eligible(&self, now: Timestamp) -> bool {
        self.is_active() && self.is_past_due(now)
    }

    /// The user id standing on the given side of this negotiation.
    #[must_use]
    pub fn party_id(&self, party: Party) -> UserId {
        match party {
            Party::Buyer => self.buyer_id,
            Party::Seller => self.seller_id,
        }
    }

    /// Whether `user` is one of the two negotiating parties.
    #[must_use]
    pub fn involves(&self, user: UserId) -> bool {
        user == self.buyer_id || user == self.seller_id
    }
}
