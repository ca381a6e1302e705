//! # Negotiation Service
//!
//! Implements [`NegotiationApi`](crate::ports::inbound::NegotiationApi) over
//! injected outbound ports. All business rules live here; the store only
//! provides conditional-update primitives.

mod negotiation;

use crate::domain::{
    proposer_at_depth, recipient_at_depth, NegotiationConfig, NegotiationError, Offer,
    OfferStatus, PermissionError, ValidationError,
};
use crate::ports::outbound::{
    GatewayError, LookupError, OfferStore, ProjectCatalog, SettlementGateway, StoreError,
    TimeSource, UserDirectory,
};
use marketplace_bus::{
    AuditAction, AuditRecord, AuditTarget, EventPublisher, MarketplaceEvent, NotificationKind,
    NotificationMessage,
};
use marketplace_types::{OfferId, UserId};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// The offer negotiation engine.
///
/// Stateless apart from its injected dependencies: every invocation reads
/// current state from the store and transitions it with a conditional
/// update, so the service can be replicated freely.
pub struct NegotiationService<S, C, U, G, T>
where
    S: OfferStore,
    C: ProjectCatalog,
    U: UserDirectory,
    G: SettlementGateway,
    T: TimeSource,
{
    store: Arc<S>,
    catalog: Arc<C>,
    directory: Arc<U>,
    settlement: Arc<G>,
    clock: Arc<T>,
    bus: Arc<dyn EventPublisher>,
    config: NegotiationConfig,
}

impl<S, C, U, G, T> NegotiationService<S, C, U, G, T>
where
    S: OfferStore,
    C: ProjectCatalog,
    U: UserDirectory,
    G: SettlementGateway,
    T: TimeSource,
{
    /// Create a service with the given dependencies and configuration.
    pub fn new(
        store: Arc<S>,
        catalog: Arc<C>,
        directory: Arc<U>,
        settlement: Arc<G>,
        clock: Arc<T>,
        bus: Arc<dyn EventPublisher>,
        config: NegotiationConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            directory,
            settlement,
            clock,
            bus,
            config,
        }
    }

    /// Create a service with the default configuration.
    pub fn with_defaults(
        store: Arc<S>,
        catalog: Arc<C>,
        directory: Arc<U>,
        settlement: Arc<G>,
        clock: Arc<T>,
        bus: Arc<dyn EventPublisher>,
    ) -> Self {
        Self::new(
            store,
            catalog,
            directory,
            settlement,
            clock,
            bus,
            NegotiationConfig::default(),
        )
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &NegotiationConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Validation helpers
    // -------------------------------------------------------------------------

    pub(crate) fn check_message(&self, message: Option<&String>) -> Result<(), NegotiationError> {
        if let Some(text) = message {
            let length = text.chars().count();
            if length > self.config.max_message_chars {
                return Err(ValidationError::MessageTooLong {
                    length,
                    max: self.config.max_message_chars,
                }
                .into());
            }
        }
        Ok(())
    }

    /// Load an offer, restricted to its negotiating parties.
    ///
    /// Outsiders get not-found: whether the offer exists is itself private.
    pub(crate) async fn load_visible(
        &self,
        actor_id: UserId,
        offer_id: OfferId,
    ) -> Result<Offer, NegotiationError> {
        let offer = self
            .store
            .find_by_id(offer_id)
            .await
            .map_err(Self::internal_store_error)?
            .ok_or(NegotiationError::OfferNotFound(offer_id))?;

        if !offer.involves(actor_id) {
            debug!(%offer_id, %actor_id, "Offer lookup by non-party");
            return Err(NegotiationError::OfferNotFound(offer_id));
        }
        Ok(offer)
    }

    pub(crate) fn require_pending(offer: &Offer) -> Result<(), NegotiationError> {
        if offer.status != OfferStatus::Pending {
            return Err(ValidationError::StaleStatus {
                expected: OfferStatus::Pending,
                actual: offer.status,
            }
            .into());
        }
        Ok(())
    }

    /// Chain depth of a node: number of parent hops to the root.
    ///
    /// Depth parity determines proposer/recipient. It is derived by walking
    /// the stored chain at call time rather than persisted, so it can never
    /// disagree with the links.
    pub(crate) async fn chain_depth(&self, offer: &Offer) -> Result<u64, NegotiationError> {
        let mut depth = 0u64;
        let mut current = offer.parent_offer_id;
        while let Some(parent_id) = current {
            let parent = self
                .store
                .find_by_id(parent_id)
                .await
                .map_err(Self::internal_store_error)?
                .ok_or_else(|| {
                    error!(%parent_id, offer_id = %offer.id, "Broken negotiation chain");
                    NegotiationError::Internal(format!(
                        "negotiation chain is broken at {parent_id}"
                    ))
                })?;
            depth += 1;
            current = parent.parent_offer_id;
        }
        Ok(depth)
    }

    /// The user who must respond to this node.
    pub(crate) async fn recipient_of(&self, offer: &Offer) -> Result<UserId, NegotiationError> {
        let depth = self.chain_depth(offer).await?;
        Ok(offer.party_id(recipient_at_depth(depth)))
    }

    /// The user who proposed this node's price.
    pub(crate) async fn proposer_of(&self, offer: &Offer) -> Result<UserId, NegotiationError> {
        let depth = self.chain_depth(offer).await?;
        Ok(offer.party_id(proposer_at_depth(depth)))
    }

    pub(crate) async fn require_recipient(
        &self,
        offer: &Offer,
        actor_id: UserId,
    ) -> Result<(), NegotiationError> {
        if self.recipient_of(offer).await? != actor_id {
            return Err(PermissionError::NotRecipient.into());
        }
        Ok(())
    }

    pub(crate) async fn require_proposer(
        &self,
        offer: &Offer,
        actor_id: UserId,
    ) -> Result<(), NegotiationError> {
        if self.proposer_of(offer).await? != actor_id {
            return Err(PermissionError::NotProposer.into());
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Error mapping
    // -------------------------------------------------------------------------

    /// Map store failures onto the caller-facing taxonomy.
    pub(crate) fn map_store_error(err: StoreError) -> NegotiationError {
        match err {
            StoreError::NotFound(id) => NegotiationError::OfferNotFound(id),
            StoreError::StaleStatus {
                expected, actual, ..
            } => ValidationError::StaleStatus { expected, actual }.into(),
            StoreError::ActiveOfferExists { existing } => {
                ValidationError::DuplicateActiveOffer { existing }.into()
            }
            other => Self::internal_store_error(other),
        }
    }

    fn internal_store_error(err: StoreError) -> NegotiationError {
        error!(error = %err, "Offer store failure");
        NegotiationError::Internal(err.to_string())
    }

    pub(crate) fn map_lookup_error(err: LookupError) -> NegotiationError {
        error!(error = %err, "Collaborator lookup failure");
        NegotiationError::Internal(err.to_string())
    }

    pub(crate) fn map_gateway_error(err: &GatewayError) -> NegotiationError {
        error!(error = %err, "Settlement gateway failure");
        NegotiationError::Internal(err.to_string())
    }

    // -------------------------------------------------------------------------
    // Fire-and-forget side effects
    // -------------------------------------------------------------------------

    /// Publish an audit record. Runs after the transition commits; the
    /// result is observed only for logging.
    pub(crate) async fn audit(
        &self,
        actor_id: Option<UserId>,
        action: AuditAction,
        offer_id: OfferId,
        metadata: serde_json::Value,
    ) {
        let receivers = self
            .bus
            .publish(MarketplaceEvent::Audit(AuditRecord {
                actor_id,
                action,
                target: AuditTarget::Offer(offer_id),
                metadata,
            }))
            .await;
        if receivers == 0 {
            warn!(?action, %offer_id, "Audit record had no consumers");
        }
    }

    /// Publish a user notification, same contract as [`Self::audit`].
    pub(crate) async fn notify(
        &self,
        recipient_id: UserId,
        kind: NotificationKind,
        payload: serde_json::Value,
    ) {
        self.bus
            .publish(MarketplaceEvent::Notification(
                NotificationMessage::new(recipient_id, kind).with_payload(payload),
            ))
            .await;
    }

    pub(crate) fn clock_now(&self) -> marketplace_types::Timestamp {
        self.clock.now()
    }
}
