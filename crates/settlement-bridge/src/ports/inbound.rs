//! # Inbound Port
//!
//! The settlement operations the marketplace drives: the hold placed on
//! acceptance, the admin overrides that settle it, and the read surface.

use crate::domain::{EscrowTransaction, SettlementError};
use async_trait::async_trait;
use marketplace_types::{AcceptedOffer, TransactionId, UserId};

/// Escrow settlement operations - inbound port.
#[async_trait]
pub trait SettlementApi: Send + Sync {
    /// Place a hold for an accepted offer and record the transaction.
    ///
    /// Idempotent keyed by the offer id: if a transaction already exists
    /// for this offer it is returned unchanged and no second hold is
    /// placed, so a retried acceptance cannot double-charge the buyer.
    async fn create_transaction_for_accepted_offer(
        &self,
        accepted: &AcceptedOffer,
    ) -> Result<EscrowTransaction, SettlementError>;

    /// Release held funds to the seller. Administrators only.
    ///
    /// Conditional on the transaction being `Held`; the loser of a
    /// release/refund race observes an invalid-state error.
    async fn manual_release(
        &self,
        admin_id: UserId,
        transaction_id: TransactionId,
    ) -> Result<EscrowTransaction, SettlementError>;

    /// Return held funds to the buyer, recording the reason.
    /// Administrators only; same conditional contract as release.
    async fn refund(
        &self,
        admin_id: UserId,
        transaction_id: TransactionId,
        reason: String,
    ) -> Result<EscrowTransaction, SettlementError>;

    /// Fetch one transaction.
    ///
    /// Visible to its buyer, its seller, and administrators; anyone else
    /// gets not-found rather than a permission error.
    async fn get_transaction(
        &self,
        actor_id: UserId,
        transaction_id: TransactionId,
    ) -> Result<EscrowTransaction, SettlementError>;
}
