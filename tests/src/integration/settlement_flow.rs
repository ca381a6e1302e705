//! # Settlement Flow
//!
//! Escrow lifecycle after acceptance: admin release, refund with reason,
//! and remediation when the processor fails mid-handoff.

#[cfg(test)]
mod tests {
    use crate::support::Marketplace;

    use offer_negotiation::{NegotiationApi, NegotiationError, OfferStatus, OfferStore};
    use settlement_bridge::{EscrowStatus, SettlementApi, SettlementError};

    /// Accept a $500 root offer and return its transaction id.
    async fn accept_root(m: &Marketplace) -> (marketplace_types::OfferId, marketplace_types::TransactionId) {
        let root = m
            .negotiation
            .create_offer(m.buyer, m.project, 50_000, None)
            .await
            .unwrap();
        let accepted = m.negotiation.accept_offer(m.seller, root.id).await.unwrap();
        (root.id, accepted.transaction_id.unwrap())
    }

    #[tokio::test]
    async fn test_admin_releases_funds_to_seller() {
        let m = Marketplace::new();
        let (_, txn_id) = accept_root(&m).await;

        let released = m.settlement.manual_release(m.admin, txn_id).await.unwrap();
        assert_eq!(released.status, EscrowStatus::Released);
        assert!(m.processor.was_released(&released.payment_reference));

        // Settled means settled: no refund afterwards.
        let err = m
            .settlement
            .refund(m.admin, txn_id, "changed my mind".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, SettlementError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_admin_refunds_with_reason() {
        let m = Marketplace::new();
        let (_, txn_id) = accept_root(&m).await;

        let refunded = m
            .settlement
            .refund(m.admin, txn_id, "seller never delivered".to_string())
            .await
            .unwrap();
        assert_eq!(refunded.status, EscrowStatus::Refunded);
        assert_eq!(
            refunded.settlement_note,
            Some("seller never delivered".to_string())
        );
        assert_eq!(
            m.processor.refund_reason(&refunded.payment_reference),
            Some("seller never delivered".to_string())
        );
    }

    #[tokio::test]
    async fn test_parties_cannot_settle_their_own_escrow() {
        let m = Marketplace::new();
        let (_, txn_id) = accept_root(&m).await;

        for actor in [m.buyer, m.seller] {
            let err = m.settlement.manual_release(actor, txn_id).await.unwrap_err();
            assert_eq!(err, SettlementError::Unauthorized);
            let err = m
                .settlement
                .refund(actor, txn_id, "mine".to_string())
                .await
                .unwrap_err();
            assert_eq!(err, SettlementError::Unauthorized);
        }

        let txn = m.settlement.get_transaction(m.admin, txn_id).await.unwrap();
        assert_eq!(txn.status, EscrowStatus::Held);
    }

    #[tokio::test]
    async fn test_processor_outage_during_accept_is_recoverable() {
        let m = Marketplace::new();

        let root = m
            .negotiation
            .create_offer(m.buyer, m.project, 50_000, None)
            .await
            .unwrap();

        // The processor is down at the moment of acceptance: the offer
        // commits to Accepted but carries no transaction link.
        m.processor.set_should_fail(true);
        let err = m.negotiation.accept_offer(m.seller, root.id).await.unwrap_err();
        assert!(matches!(err, NegotiationError::Internal(_)));

        let stranded = m.offers.find_by_id(root.id).await.unwrap().unwrap();
        assert_eq!(stranded.status, OfferStatus::Accepted);
        assert!(stranded.transaction_id.is_none());
        assert!(m.transactions.is_empty());

        // Remediation: once the processor recovers, re-driving the handoff
        // for the accepted terms places exactly one hold.
        m.processor.set_should_fail(false);
        let accepted = marketplace_types::AcceptedOffer {
            offer_id: stranded.id,
            project_id: stranded.project_id,
            buyer_id: stranded.buyer_id,
            seller_id: stranded.seller_id,
            amount_cents: stranded.offered_price_cents,
        };
        let txn = m
            .settlement
            .create_transaction_for_accepted_offer(&accepted)
            .await
            .unwrap();
        assert_eq!(txn.status, EscrowStatus::Held);
        assert_eq!(txn.amount_cents, 50_000);
        assert_eq!(m.processor.hold_count(), 1);
    }
}
