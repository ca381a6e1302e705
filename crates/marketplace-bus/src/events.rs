//! # Marketplace Events
//!
//! Event types that flow through the bus: audit records for compliance and
//! notification messages for buyers and sellers.

use marketplace_types::{OfferId, TransactionId, UserId};
use serde::{Deserialize, Serialize};

/// All events that can be published to the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MarketplaceEvent {
    /// A compliance audit record. Every state change on an offer or an
    /// escrow transaction emits exactly one of these.
    Audit(AuditRecord),

    /// A user-facing notification (in-app, email, push; the consumer
    /// decides the channel).
    Notification(NotificationMessage),
}

impl MarketplaceEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::Audit(_) => EventTopic::Audit,
            Self::Notification(_) => EventTopic::Notification,
        }
    }
}

/// One audit trail entry.
///
/// Mirrors the compliance sink's `record(actor, action, target, metadata)`
/// call shape: who did what to which entity, plus free-form context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// The acting user. `None` for system-initiated transitions (the expiry
    /// sweep has no actor).
    pub actor_id: Option<UserId>,
    /// What happened.
    pub action: AuditAction,
    /// The entity the action applied to.
    pub target: AuditTarget,
    /// Free-form context: prices, reasons, linked ids.
    pub metadata: serde_json::Value,
}

/// The closed set of auditable actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    /// A root offer was created.
    OfferCreated,
    /// A pending offer was countered, spawning a child node.
    OfferCountered,
    /// A pending offer was accepted.
    OfferAccepted,
    /// A pending offer was rejected by its recipient.
    OfferRejected,
    /// A pending offer was withdrawn by its proposer.
    OfferWithdrawn,
    /// An offer passed its deadline and was expired by the sweep.
    OfferExpired,
    /// Escrow funds were placed on hold for an accepted offer.
    TransactionHeld,
    /// An admin released escrowed funds to the seller.
    FundsReleased,
    /// An admin refunded escrowed funds to the buyer.
    FundsRefunded,
    /// Settlement could not be started for an accepted offer.
    SettlementFailed,
}

/// The entity an audit record targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditTarget {
    /// An offer node.
    Offer(OfferId),
    /// An escrow transaction.
    Transaction(TransactionId),
}

/// A user-facing notification message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationMessage {
    /// Who should be notified.
    pub recipient_id: UserId,
    /// What kind of event this notifies about.
    pub kind: NotificationKind,
    /// Channel-agnostic payload the notifier renders.
    pub payload: serde_json::Value,
}

/// Notification kinds, from the recipient's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    /// A buyer opened an offer on your listing.
    OfferReceived,
    /// The other party countered your offer.
    CounterReceived,
    /// The other party accepted your offer.
    OfferAccepted,
    /// The other party rejected your offer.
    OfferRejected,
    /// The proposer withdrew the offer you were reviewing.
    OfferWithdrawn,
    /// An offer involving you expired unanswered.
    OfferExpired,
    /// Escrowed funds were released to you.
    FundsReleased,
    /// Escrowed funds were refunded to you.
    FundsRefunded,
}

impl NotificationMessage {
    /// Build a notification with an empty payload.
    #[must_use]
    pub fn new(recipient_id: UserId, kind: NotificationKind) -> Self {
        Self {
            recipient_id,
            kind,
            payload: serde_json::Value::Null,
        }
    }

    /// Attach a payload.
    #[must_use]
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Compliance audit records.
    Audit,
    /// User-facing notifications.
    Notification,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Notification recipients to include. Empty means all recipients.
    /// Only meaningful for notification events; audit records always pass.
    pub recipients: Vec<UserId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            recipients: Vec::new(),
        }
    }

    /// Create a filter for notifications addressed to specific users.
    #[must_use]
    pub fn for_recipients(recipients: Vec<UserId>) -> Self {
        Self {
            topics: vec![EventTopic::Notification],
            recipients,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &MarketplaceEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let recipient_match = self.recipients.is_empty()
            || match event {
                MarketplaceEvent::Notification(msg) => self.recipients.contains(&msg.recipient_id),
                MarketplaceEvent::Audit(_) => true,
            };

        topic_match && recipient_match
    }
}
