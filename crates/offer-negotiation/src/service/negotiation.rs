//! # Negotiation API Implementation
//!
//! The six state-machine operations plus the read surface.

use super::*;
use crate::ports::inbound::{NegotiationApi, OfferDetails, OfferScope, SweepReport};
use crate::domain::RootOfferParams;
use async_trait::async_trait;
use marketplace_types::{
    AcceptedOffer, Cents, OfferId, Page, PageRequest, ProjectId, UserId,
};
use serde_json::json;
use tracing::info;

#[async_trait]
impl<S, C, U, G, T> NegotiationApi for NegotiationService<S, C, U, G, T>
where
    S: OfferStore + 'static,
    C: ProjectCatalog + 'static,
    U: UserDirectory + 'static,
    G: SettlementGateway + 'static,
    T: TimeSource + 'static,
{
    async fn create_offer(
        &self,
        buyer_id: UserId,
        project_id: ProjectId,
        price_cents: Cents,
        message: Option<String>,
    ) -> Result<Offer, NegotiationError> {
        self.check_message(message.as_ref())?;

        let project = self
            .catalog
            .find_by_id(project_id)
            .await
            .map_err(Self::map_lookup_error)?
            .ok_or(NegotiationError::ProjectNotFound(project_id))?;

        if buyer_id == project.seller_id {
            return Err(PermissionError::BuyerIsSeller.into());
        }
        if !project.status.is_sellable() {
            return Err(ValidationError::ProjectNotSellable.into());
        }

        // Effective floor: platform-wide minimum, raised by the listing's
        // own minimum when present.
        let floor = self
            .config
            .platform_minimum_cents
            .max(project.minimum_offer_cents.unwrap_or(0));
        if price_cents < floor {
            return Err(ValidationError::PriceBelowMinimum {
                offered_cents: price_cents,
                minimum_cents: floor,
            }
            .into());
        }
        if price_cents >= project.price_cents {
            return Err(ValidationError::PriceNotBelowListing {
                offered_cents: price_cents,
                ceiling_cents: project.price_cents,
            }
            .into());
        }

        // Pre-check for a friendly error; the store re-checks atomically on
        // insert, so a racing duplicate still cannot slip through.
        if let Some(existing) = self
            .store
            .find_active_root_for_buyer(buyer_id, project_id)
            .await
            .map_err(Self::map_store_error)?
        {
            return Err(ValidationError::DuplicateActiveOffer {
                existing: existing.id,
            }
            .into());
        }

        let now = self.clock_now();
        let offer = Offer::root(RootOfferParams {
            project_id,
            buyer_id,
            seller_id: project.seller_id,
            offered_price_cents: price_cents,
            original_price_cents: project.price_cents,
            message,
            created_at: now,
            expires_at: now + self.config.offer_expiry_secs,
        });

        self.store
            .insert_root(offer.clone())
            .await
            .map_err(Self::map_store_error)?;

        info!(
            offer_id = %offer.id,
            %project_id,
            %buyer_id,
            offered_price_cents = price_cents,
            "Root offer created"
        );

        self.audit(
            Some(buyer_id),
            AuditAction::OfferCreated,
            offer.id,
            json!({
                "project_id": project_id,
                "offered_price_cents": price_cents,
                "original_price_cents": project.price_cents,
            }),
        )
        .await;
        self.notify(
            offer.seller_id,
            NotificationKind::OfferReceived,
            json!({ "offer_id": offer.id, "offered_price_cents": price_cents }),
        )
        .await;

        Ok(offer)
    }

    async fn counter_offer(
        &self,
        actor_id: UserId,
        offer_id: OfferId,
        counter_price_cents: Cents,
        message: Option<String>,
    ) -> Result<Offer, NegotiationError> {
        self.check_message(message.as_ref())?;

        let offer = self.load_visible(actor_id, offer_id).await?;
        Self::require_pending(&offer)?;
        self.require_recipient(&offer, actor_id).await?;

        if counter_price_cents < self.config.platform_minimum_cents {
            return Err(ValidationError::PriceBelowMinimum {
                offered_cents: counter_price_cents,
                minimum_cents: self.config.platform_minimum_cents,
            }
            .into());
        }
        // The chain's ceiling is the original listed price, not the node
        // being countered: a seller may counter above the buyer's offer.
        if counter_price_cents >= offer.original_price_cents {
            return Err(ValidationError::PriceNotBelowListing {
                offered_cents: counter_price_cents,
                ceiling_cents: offer.original_price_cents,
            }
            .into());
        }

        let now = self.clock_now();
        let child = Offer::counter_of(
            &offer,
            counter_price_cents,
            message,
            now,
            now + self.config.offer_expiry_secs,
        );

        let (parent, child) = self
            .store
            .counter_transition(offer.id, OfferStatus::Pending, now, child)
            .await
            .map_err(Self::map_store_error)?;

        info!(
            parent_offer_id = %parent.id,
            child_offer_id = %child.id,
            %actor_id,
            counter_price_cents,
            "Offer countered"
        );

        self.audit(
            Some(actor_id),
            AuditAction::OfferCountered,
            parent.id,
            json!({
                "child_offer_id": child.id,
                "counter_price_cents": counter_price_cents,
            }),
        )
        .await;
        // The counter goes to whoever proposed the parent node.
        let counter_recipient = self.recipient_of(&child).await?;
        self.notify(
            counter_recipient,
            NotificationKind::CounterReceived,
            json!({ "offer_id": child.id, "counter_price_cents": counter_price_cents }),
        )
        .await;

        Ok(child)
    }

    async fn accept_offer(
        &self,
        actor_id: UserId,
        offer_id: OfferId,
    ) -> Result<Offer, NegotiationError> {
        let offer = self.load_visible(actor_id, offer_id).await?;
        Self::require_pending(&offer)?;
        self.require_recipient(&offer, actor_id).await?;
        let proposer = self.proposer_of(&offer).await?;

        let now = self.clock_now();
        // The conditional update decides the race; a simultaneous withdraw
        // or second accept loses here with a stale-status error.
        let accepted = self
            .store
            .transition_status(offer.id, OfferStatus::Pending, OfferStatus::Accepted, Some(now))
            .await
            .map_err(Self::map_store_error)?;

        info!(%offer_id, %actor_id, amount_cents = accepted.offered_price_cents, "Offer accepted");

        let handoff = AcceptedOffer {
            offer_id: accepted.id,
            project_id: accepted.project_id,
            buyer_id: accepted.buyer_id,
            seller_id: accepted.seller_id,
            amount_cents: accepted.offered_price_cents,
        };
        let transaction_id = match self.settlement.create_transaction(&handoff).await {
            Ok(id) => id,
            Err(err) => {
                // The acceptance is committed; the hold is keyed by offer
                // id, so remediation can safely retry it.
                self.audit(
                    Some(actor_id),
                    AuditAction::SettlementFailed,
                    accepted.id,
                    json!({ "error": err.to_string() }),
                )
                .await;
                return Err(Self::map_gateway_error(&err));
            }
        };

        let linked = self
            .store
            .link_transaction(accepted.id, transaction_id)
            .await
            .map_err(Self::map_store_error)?;

        self.audit(
            Some(actor_id),
            AuditAction::OfferAccepted,
            linked.id,
            json!({
                "transaction_id": transaction_id,
                "amount_cents": linked.offered_price_cents,
            }),
        )
        .await;
        self.notify(
            proposer,
            NotificationKind::OfferAccepted,
            json!({ "offer_id": linked.id, "amount_cents": linked.offered_price_cents }),
        )
        .await;

        Ok(linked)
    }

    async fn reject_offer(
        &self,
        actor_id: UserId,
        offer_id: OfferId,
    ) -> Result<Offer, NegotiationError> {
        let offer = self.load_visible(actor_id, offer_id).await?;
        Self::require_pending(&offer)?;
        self.require_recipient(&offer, actor_id).await?;
        let proposer = self.proposer_of(&offer).await?;

        let now = self.clock_now();
        let rejected = self
            .store
            .transition_status(offer.id, OfferStatus::Pending, OfferStatus::Rejected, Some(now))
            .await
            .map_err(Self::map_store_error)?;

        info!(%offer_id, %actor_id, "Offer rejected");

        self.audit(Some(actor_id), AuditAction::OfferRejected, rejected.id, json!({}))
            .await;
        self.notify(
            proposer,
            NotificationKind::OfferRejected,
            json!({ "offer_id": rejected.id }),
        )
        .await;

        Ok(rejected)
    }

    async fn withdraw_offer(
        &self,
        actor_id: UserId,
        offer_id: OfferId,
    ) -> Result<Offer, NegotiationError> {
        let offer = self.load_visible(actor_id, offer_id).await?;
        Self::require_pending(&offer)?;
        self.require_proposer(&offer, actor_id).await?;
        let recipient = self.recipient_of(&offer).await?;

        let now = self.clock_now();
        let withdrawn = self
            .store
            .transition_status(offer.id, OfferStatus::Pending, OfferStatus::Withdrawn, Some(now))
            .await
            .map_err(Self::map_store_error)?;

        info!(%offer_id, %actor_id, "Offer withdrawn");

        self.audit(Some(actor_id), AuditAction::OfferWithdrawn, withdrawn.id, json!({}))
            .await;
        self.notify(
            recipient,
            NotificationKind::OfferWithdrawn,
            json!({ "offer_id": withdrawn.id }),
        )
        .await;

        Ok(withdrawn)
    }

    async fn expire_offers(&self) -> Result<SweepReport, NegotiationError> {
        let now = self.clock_now();
        let eligible = self
            .store
            .find_expired_eligible(now)
            .await
            .map_err(Self::map_store_error)?;

        let mut report = SweepReport {
            examined: eligible.len(),
            expired: 0,
        };

        for offer in eligible {
            // Per-offer conditional update: losing to a concurrent
            // caller-driven transition (or another sweep) is a no-op.
            match self
                .store
                .transition_status(offer.id, offer.status, OfferStatus::Expired, Some(now))
                .await
            {
                Ok(expired) => {
                    report.expired += 1;
                    self.audit(
                        None,
                        AuditAction::OfferExpired,
                        expired.id,
                        json!({ "expires_at": expired.expires_at }),
                    )
                    .await;
                    // A countered parent has a live child; only the lapse of
                    // a still-pending node is worth telling the parties.
                    if offer.status == OfferStatus::Pending {
                        for party in [expired.buyer_id, expired.seller_id] {
                            self.notify(
                                party,
                                NotificationKind::OfferExpired,
                                json!({ "offer_id": expired.id }),
                            )
                            .await;
                        }
                    }
                }
                Err(StoreError::StaleStatus { offer_id, .. }) => {
                    debug!(%offer_id, "Sweep lost transition race, skipping");
                }
                Err(StoreError::NotFound(offer_id)) => {
                    debug!(%offer_id, "Offer vanished between select and sweep");
                }
                Err(other) => return Err(Self::map_store_error(other)),
            }
        }

        info!(examined = report.examined, expired = report.expired, "Expiry sweep finished");
        Ok(report)
    }

    async fn get_offer(
        &self,
        actor_id: UserId,
        offer_id: OfferId,
    ) -> Result<OfferDetails, NegotiationError> {
        let offer = self.load_visible(actor_id, offer_id).await?;

        let project = self
            .catalog
            .find_by_id(offer.project_id)
            .await
            .map_err(Self::map_lookup_error)?
            .ok_or(NegotiationError::ProjectNotFound(offer.project_id))?;
        let buyer = self
            .directory
            .find_by_id(offer.buyer_id)
            .await
            .map_err(Self::map_lookup_error)?
            .ok_or_else(|| NegotiationError::Internal("buyer record missing".to_string()))?;
        let seller = self
            .directory
            .find_by_id(offer.seller_id)
            .await
            .map_err(Self::map_lookup_error)?
            .ok_or_else(|| NegotiationError::Internal("seller record missing".to_string()))?;

        Ok(OfferDetails {
            offer,
            project,
            buyer,
            seller,
        })
    }

    async fn list_offers(
        &self,
        actor_id: UserId,
        scope: OfferScope,
        status: Option<OfferStatus>,
        page: PageRequest,
    ) -> Result<Page<Offer>, NegotiationError> {
        match scope {
            OfferScope::AsBuyer => self
                .store
                .find_by_buyer(actor_id, status, page)
                .await
                .map_err(Self::map_store_error),
            OfferScope::AsSeller => self
                .store
                .find_by_seller(actor_id, status, page)
                .await
                .map_err(Self::map_store_error),
            OfferScope::Project(project_id) => {
                let project = self
                    .catalog
                    .find_by_id(project_id)
                    .await
                    .map_err(Self::map_lookup_error)?
                    .ok_or(NegotiationError::ProjectNotFound(project_id))?;
                if project.seller_id != actor_id {
                    return Err(PermissionError::NotProjectOwner.into());
                }
                self.store
                    .find_by_project(project_id, status, page)
                    .await
                    .map_err(Self::map_store_error)
            }
        }
    }
}
