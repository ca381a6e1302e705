//! [`SettlementApi`] implementation.

use super::*;
use crate::ports::inbound::SettlementApi;
use async_trait::async_trait;
use marketplace_types::AcceptedOffer;
use serde_json::json;
use tracing::{debug, info};

#[async_trait]
impl<S, P, A, T> SettlementApi for SettlementService<S, P, A, T>
where
    S: TransactionStore,
    P: PaymentProcessor,
    A: AdminDirectory,
    T: TimeSource,
{
    async fn create_transaction_for_accepted_offer(
        &self,
        accepted: &AcceptedOffer,
    ) -> Result<EscrowTransaction, SettlementError> {
        if let Some(existing) = self
            .store
            .find_by_offer(accepted.offer_id)
            .await
            .map_err(Self::map_store_error)?
        {
            debug!(
                offer_id = %accepted.offer_id,
                transaction_id = %existing.id,
                "Offer already settled, returning existing transaction"
            );
            return Ok(existing);
        }

        // The hold is keyed by the offer id on the processor side, so a
        // concurrent duplicate of this call places at most one hold.
        let reference = self
            .processor
            .hold_funds(
                &accepted.offer_id.to_string(),
                accepted.buyer_id,
                accepted.amount_cents,
            )
            .await
            .map_err(|e| Self::map_processor_error(&e))?;

        let txn = EscrowTransaction::held(accepted, reference, self.clock_now());
        let stored = self
            .store
            .insert_if_absent(txn.clone())
            .await
            .map_err(Self::map_store_error)?;

        if stored.id == txn.id {
            info!(
                transaction_id = %stored.id,
                offer_id = %stored.offer_id,
                amount_cents = stored.amount_cents,
                "Escrow hold placed"
            );
            self.audit(
                None,
                AuditAction::TransactionHeld,
                stored.id,
                json!({
                    "offer_id": stored.offer_id,
                    "amount_cents": stored.amount_cents,
                }),
            )
            .await;
        }
        Ok(stored)
    }

    async fn manual_release(
        &self,
        admin_id: UserId,
        transaction_id: TransactionId,
    ) -> Result<EscrowTransaction, SettlementError> {
        self.require_admin(admin_id).await?;
        let txn = self.load_held(transaction_id).await?;

        // Processor first: its release is idempotent on the reference, so a
        // crash between the two steps is repaired by retrying this call.
        self.processor
            .release(&txn.payment_reference)
            .await
            .map_err(|e| Self::map_processor_error(&e))?;

        let released = self
            .store
            .transition_status(
                transaction_id,
                EscrowStatus::Held,
                EscrowStatus::Released,
                self.clock_now(),
                None,
            )
            .await
            .map_err(Self::map_store_error)?;

        info!(%transaction_id, %admin_id, "Escrow released to seller");
        self.audit(
            Some(admin_id),
            AuditAction::FundsReleased,
            transaction_id,
            json!({
                "offer_id": released.offer_id,
                "amount_cents": released.amount_cents,
            }),
        )
        .await;
        self.notify_parties(
            &released,
            NotificationKind::FundsReleased,
            json!({
                "transaction_id": transaction_id,
                "amount_cents": released.amount_cents,
            }),
        )
        .await;

        Ok(released)
    }

    async fn refund(
        &self,
        admin_id: UserId,
        transaction_id: TransactionId,
        reason: String,
    ) -> Result<EscrowTransaction, SettlementError> {
        self.require_admin(admin_id).await?;
        let txn = self.load_held(transaction_id).await?;

        self.processor
            .refund(&txn.payment_reference, &reason)
            .await
            .map_err(|e| Self::map_processor_error(&e))?;

        let refunded = self
            .store
            .transition_status(
                transaction_id,
                EscrowStatus::Held,
                EscrowStatus::Refunded,
                self.clock_now(),
                Some(reason.clone()),
            )
            .await
            .map_err(Self::map_store_error)?;

        info!(%transaction_id, %admin_id, reason, "Escrow refunded to buyer");
        self.audit(
            Some(admin_id),
            AuditAction::FundsRefunded,
            transaction_id,
            json!({
                "offer_id": refunded.offer_id,
                "amount_cents": refunded.amount_cents,
                "reason": reason,
            }),
        )
        .await;
        self.notify_parties(
            &refunded,
            NotificationKind::FundsRefunded,
            json!({
                "transaction_id": transaction_id,
                "amount_cents": refunded.amount_cents,
            }),
        )
        .await;

        Ok(refunded)
    }

    async fn get_transaction(
        &self,
        actor_id: UserId,
        transaction_id: TransactionId,
    ) -> Result<EscrowTransaction, SettlementError> {
        let txn = self
            .store
            .find_by_id(transaction_id)
            .await
            .map_err(Self::map_store_error)?
            .ok_or(SettlementError::TransactionNotFound(transaction_id))?;

        // Parties and admins only; existence is not leaked to anyone else.
        if !txn.involves(actor_id) {
            let is_admin = self
                .admins
                .is_admin(actor_id)
                .await
                .unwrap_or(false);
            if !is_admin {
                debug!(%transaction_id, %actor_id, "Transaction lookup by non-party");
                return Err(SettlementError::TransactionNotFound(transaction_id));
            }
        }
        Ok(txn)
    }
}
