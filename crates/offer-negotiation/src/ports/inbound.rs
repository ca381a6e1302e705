//! # Inbound Port
//!
//! The operations the API layer drives. Each takes the acting user's
//! identity and returns the updated offer or a typed error.

use crate::domain::{NegotiationError, Offer, OfferStatus};
use async_trait::async_trait;
use marketplace_types::{
    Cents, OfferId, Page, PageRequest, ProjectId, ProjectSummary, UserId, UserSummary,
};
use serde::{Deserialize, Serialize};

/// An offer with its referential includes, for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferDetails {
    /// The offer node itself.
    pub offer: Offer,
    /// The project under negotiation.
    pub project: ProjectSummary,
    /// Buyer summary.
    pub buyer: UserSummary,
    /// Seller summary.
    pub seller: UserSummary,
}

/// Which offers a listing query targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OfferScope {
    /// Offers where the caller is the buyer.
    AsBuyer,
    /// Offers where the caller is the seller.
    AsSeller,
    /// Offers on one project. Restricted to the project's seller.
    Project(ProjectId),
}

/// Result of one expiry sweep run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Offers that were past due and in an eligible status when selected.
    pub examined: usize,
    /// Offers actually transitioned to `Expired` by this run. Offers that
    /// raced with a caller-driven transition are examined but not expired.
    pub expired: usize,
}

/// Offer negotiation operations - inbound port.
#[async_trait]
pub trait NegotiationApi: Send + Sync {
    /// Open a root offer on a project.
    ///
    /// Fails with a validation error if the project is not sellable, the
    /// price misses the floor or ceiling, or the buyer already has an
    /// active negotiation on this project; with a permission error if the
    /// buyer owns the project.
    async fn create_offer(
        &self,
        buyer_id: UserId,
        project_id: ProjectId,
        price_cents: Cents,
        message: Option<String>,
    ) -> Result<Offer, NegotiationError>;

    /// Counter a pending offer, spawning a new pending child node.
    ///
    /// Only the node's recipient may counter. The parent's move to
    /// `Countered` and the child's insertion commit atomically. Returns the
    /// child.
    async fn counter_offer(
        &self,
        actor_id: UserId,
        offer_id: OfferId,
        counter_price_cents: Cents,
        message: Option<String>,
    ) -> Result<Offer, NegotiationError>;

    /// Accept a pending offer and hand off to settlement.
    ///
    /// Only the node's recipient may accept. The settlement hold is
    /// idempotent keyed by the offer id, so a retried call cannot
    /// double-charge.
    async fn accept_offer(
        &self,
        actor_id: UserId,
        offer_id: OfferId,
    ) -> Result<Offer, NegotiationError>;

    /// Reject a pending offer. Terminal; restarting negotiation requires a
    /// fresh root offer.
    async fn reject_offer(
        &self,
        actor_id: UserId,
        offer_id: OfferId,
    ) -> Result<Offer, NegotiationError>;

    /// Withdraw a pending offer. Only its proposer may do this.
    async fn withdraw_offer(
        &self,
        actor_id: UserId,
        offer_id: OfferId,
    ) -> Result<Offer, NegotiationError>;

    /// Expire every past-due active offer.
    ///
    /// Safe to run repeatedly and concurrently: each offer's transition is
    /// an independent conditional update, and losing a race is a no-op.
    async fn expire_offers(&self) -> Result<SweepReport, NegotiationError>;

    /// Fetch one offer with its relations.
    ///
    /// Restricted to the negotiating parties; anyone else gets not-found
    /// rather than a permission error, so existence is not leaked.
    async fn get_offer(
        &self,
        actor_id: UserId,
        offer_id: OfferId,
    ) -> Result<OfferDetails, NegotiationError>;

    /// Page through offers visible to the caller.
    async fn list_offers(
        &self,
        actor_id: UserId,
        scope: OfferScope,
        status: Option<OfferStatus>,
        page: PageRequest,
    ) -> Result<Page<Offer>, NegotiationError>;
}
