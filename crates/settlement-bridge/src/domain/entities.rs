//! # Escrow Transaction
//!
//! One row per accepted offer: the money held, who it moves between, and
//! whether it has settled.

use marketplace_types::{
    AcceptedOffer, Cents, OfferId, ProjectId, Timestamp, TransactionId, UserId,
};
use serde::{Deserialize, Serialize};

/// The identifier the payment processor issues for a hold.
///
/// Opaque to this crate; it is only ever handed back to the processor to
/// release or refund the same hold.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentReference(pub String);

impl std::fmt::Display for PaymentReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the held funds currently are.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EscrowStatus {
    /// Funds are held in escrow.
    Held,
    /// Funds were released to the seller.
    Released,
    /// Funds were returned to the buyer.
    Refunded,
}

impl EscrowStatus {
    /// Whether the money has left escrow, in either direction.
    #[must_use]
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Released | Self::Refunded)
    }

    /// Valid status-machine moves. `Held` settles exactly once.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Held, Self::Released) | (Self::Held, Self::Refunded)
        )
    }
}

/// An escrow transaction, created when an offer is accepted.
///
/// Keyed idempotently by `offer_id`: an offer has at most one transaction,
/// no matter how many times its acceptance is retried.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowTransaction {
    /// Unique transaction identifier.
    pub id: TransactionId,
    /// The accepted offer this transaction settles.
    pub offer_id: OfferId,
    /// The project being sold.
    pub project_id: ProjectId,
    /// Who pays.
    pub buyer_id: UserId,
    /// Who gets paid on release.
    pub seller_id: UserId,
    /// The agreed amount, in minor units.
    pub amount_cents: Cents,
    /// Processor-issued handle for the hold.
    pub payment_reference: PaymentReference,
    /// Current position of the funds.
    pub status: EscrowStatus,
    /// When the hold was placed.
    pub created_at: Timestamp,
    /// When the funds left escrow. `None` while held.
    pub settled_at: Option<Timestamp>,
    /// Admin-supplied reason on a manual override.
    pub settlement_note: Option<String>,
}

impl EscrowTransaction {
    /// Build a freshly-held transaction for an accepted offer.
    #[must_use]
    pub fn held(
        accepted: &AcceptedOffer,
        payment_reference: PaymentReference,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: TransactionId::generate(),
            offer_id: accepted.offer_id,
            project_id: accepted.project_id,
            buyer_id: accepted.buyer_id,
            seller_id: accepted.seller_id,
            amount_cents: accepted.amount_cents,
            payment_reference,
            status: EscrowStatus::Held,
            created_at,
            settled_at: None,
            settlement_note: None,
        }
    }

    /// Whether this user is the buyer or the seller.
    #[must_use]
    pub fn involves(&self, user_id: UserId) -> bool {
        self.buyer_id == user_id || self.seller_id == user_id
    }
}
