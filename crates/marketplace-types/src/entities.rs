//! # Cross-Subsystem Entities
//!
//! Summary records exchanged between subsystems: the project and user views
//! the negotiation engine reads, and the accepted-offer payload it hands to
//! the settlement bridge.

use crate::ids::{OfferId, ProjectId, UserId};
use serde::{Deserialize, Serialize};

/// Monetary amount in minor units (cents). All prices on the marketplace are
/// integer cents; fractional amounts do not exist.
pub type Cents = u64;

/// Seconds since the Unix epoch.
pub type Timestamp = u64;

/// Lifecycle status of a project listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    /// Listed and sellable; offers may be opened against it.
    Active,
    /// Temporarily hidden by the seller or by moderation.
    Suspended,
    /// Sold; the listing is retained for history.
    Sold,
    /// Removed by the seller.
    Delisted,
}

impl ProjectStatus {
    /// Whether new offers may be opened against a project in this status.
    #[must_use]
    pub fn is_sellable(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Read-only view of a project listing, as served by the project catalog.
///
/// The negotiation engine only ever reads these fields; project CRUD lives
/// in a different subsystem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    /// Owner of the listing. Always the counterparty of a root offer.
    pub seller_id: UserId,
    /// Listing title, included for display.
    pub title: String,
    /// Listed asking price in cents.
    pub price_cents: Cents,
    /// Listing lifecycle status.
    pub status: ProjectStatus,
    /// Optional per-listing floor for offers, in cents. When set, offers
    /// below this are rejected even if they clear the platform minimum.
    pub minimum_offer_cents: Option<Cents>,
}

/// Read-only view of a user, included alongside offers for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// The user's id.
    pub id: UserId,
    /// Public display name.
    pub display_name: String,
}

/// The payload handed from the negotiation engine to the settlement bridge
/// when an offer is accepted.
///
/// Carries everything the bridge needs to place an escrow hold without
/// reading the offer store itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedOffer {
    /// The accepted offer node. Settlement is idempotent keyed by this id.
    pub offer_id: OfferId,
    /// Project being sold.
    pub project_id: ProjectId,
    /// Buying party (pays into escrow).
    pub buyer_id: UserId,
    /// Selling party (paid on release).
    pub seller_id: UserId,
    /// Agreed price in cents: the accepted node's offered price.
    pub amount_cents: Cents,
}
