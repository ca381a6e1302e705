//! # Domain Value Objects
//!
//! The offer status machine and the proposer/recipient role alternation.

use serde::{Deserialize, Serialize};

/// Offer lifecycle status.
///
/// `Pending` is the only state that accepts caller-driven transitions.
/// `Countered` is terminal for the node itself but remains *active* for the
/// buyer-uniqueness rule and stays eligible for the expiry sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OfferStatus {
    /// Awaiting a response from the recipient.
    #[default]
    Pending,
    /// Accepted by the recipient; settlement begins.
    Accepted,
    /// Rejected by the recipient.
    Rejected,
    /// Superseded by a counter-offer child node.
    Countered,
    /// Withdrawn by its proposer before any response.
    Withdrawn,
    /// Passed its deadline without a response.
    Expired,
}

impl OfferStatus {
    /// Check if a transition is valid.
    #[must_use]
    pub fn can_transition_to(&self, next: OfferStatus) -> bool {
        match (self, next) {
            (Self::Pending, Self::Accepted)
            | (Self::Pending, Self::Rejected)
            | (Self::Pending, Self::Countered)
            | (Self::Pending, Self::Withdrawn)
            | (Self::Pending, Self::Expired) => true,
            // The sweep may expire a negotiation whose countered parent is
            // past due; the child is swept independently.
            (Self::Countered, Self::Expired) => true,
            _ => false,
        }
    }

    /// Whether this status keeps the (buyer, project) negotiation slot
    /// occupied. A buyer may not open a second root offer while an active
    /// one exists.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Countered)
    }

    /// Whether no further caller-driven transition is possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// The two sides of a negotiation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Party {
    /// The party trying to buy the project.
    Buyer,
    /// The project owner.
    Seller,
}

impl Party {
    /// The other side.
    #[must_use]
    pub fn other(&self) -> Party {
        match self {
            Self::Buyer => Self::Seller,
            Self::Seller => Self::Buyer,
        }
    }
}

/// Who proposed the price at a given chain depth.
///
/// Roles alternate along the chain and are derived, never stored: a root
/// offer (depth 0) is always buyer-proposed, its counter (depth 1) is
/// seller-proposed, and so on. Deriving from depth parity means the stored
/// chain and the role can never disagree.
#[must_use]
pub fn proposer_at_depth(depth: u64) -> Party {
    if depth % 2 == 0 {
        Party::Buyer
    } else {
        Party::Seller
    }
}

/// Who must respond to the offer at a given chain depth.
#[must_use]
pub fn recipient_at_depth(depth: u64) -> Party {
    proposer_at_depth(depth).other()
}
