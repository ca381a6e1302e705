//! # Negotiation Flow
//!
//! Full negotiation chains driven end to end, with acceptance placing a
//! real escrow hold through the gateway adapter.

#[cfg(test)]
mod tests {
    use crate::support::{Marketplace, LISTED_PRICE};

    use offer_negotiation::{
        NegotiationApi, NegotiationError, OfferStatus, OfferStore, PermissionError,
        ValidationError,
    };
    use settlement_bridge::{EscrowStatus, SettlementApi};

    #[tokio::test]
    async fn test_offer_counter_accept_places_escrow_hold() {
        // The canonical walkthrough: $500 offer on a $1000 listing,
        // countered at $750, accepted by the buyer.
        let m = Marketplace::new();

        let root = m
            .negotiation
            .create_offer(m.buyer, m.project, 50_000, Some("would love this".to_string()))
            .await
            .unwrap();
        let counter = m
            .negotiation
            .counter_offer(m.seller, root.id, 75_000, None)
            .await
            .unwrap();
        let accepted = m.negotiation.accept_offer(m.buyer, counter.id).await.unwrap();

        assert_eq!(accepted.status, OfferStatus::Accepted);
        let txn_id = accepted.transaction_id.unwrap();

        // The bridge holds exactly the countered amount.
        let txn = m.settlement.get_transaction(m.admin, txn_id).await.unwrap();
        assert_eq!(txn.status, EscrowStatus::Held);
        assert_eq!(txn.amount_cents, 75_000);
        assert_eq!(txn.offer_id, counter.id);
        assert_eq!(txn.buyer_id, m.buyer);
        assert_eq!(txn.seller_id, m.seller);
        assert_eq!(m.processor.hold_count(), 1);

        // The root stays countered; only the accepted node links a
        // transaction.
        let parent = m.offers.find_by_id(root.id).await.unwrap().unwrap();
        assert_eq!(parent.status, OfferStatus::Countered);
        assert!(parent.transaction_id.is_none());
    }

    #[tokio::test]
    async fn test_multi_round_chain_keeps_ceiling_and_alternates_roles() {
        let m = Marketplace::new();

        let root = m
            .negotiation
            .create_offer(m.buyer, m.project, 50_000, None)
            .await
            .unwrap();
        let c1 = m
            .negotiation
            .counter_offer(m.seller, root.id, 90_000, None)
            .await
            .unwrap();
        let c2 = m
            .negotiation
            .counter_offer(m.buyer, c1.id, 65_000, None)
            .await
            .unwrap();
        let c3 = m
            .negotiation
            .counter_offer(m.seller, c2.id, 80_000, None)
            .await
            .unwrap();

        // The ceiling never moves, no matter how deep the chain goes.
        for node in [&root, &c1, &c2, &c3] {
            assert_eq!(node.original_price_cents, LISTED_PRICE);
        }
        let err = m
            .negotiation
            .counter_offer(m.buyer, c3.id, LISTED_PRICE, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            NegotiationError::Validation(ValidationError::PriceNotBelowListing { .. })
        ));

        // Depth 3 is seller-proposed, so only the buyer can accept it.
        let err = m.negotiation.accept_offer(m.seller, c3.id).await.unwrap_err();
        assert!(matches!(
            err,
            NegotiationError::Permission(PermissionError::NotRecipient)
        ));
        let accepted = m.negotiation.accept_offer(m.buyer, c3.id).await.unwrap();

        let txn = m
            .settlement
            .get_transaction(m.admin, accepted.transaction_id.unwrap())
            .await
            .unwrap();
        assert_eq!(txn.amount_cents, 80_000);
    }

    #[tokio::test]
    async fn test_rejection_frees_the_negotiation_slot() {
        let m = Marketplace::new();

        let first = m
            .negotiation
            .create_offer(m.buyer, m.project, 50_000, None)
            .await
            .unwrap();

        let err = m
            .negotiation
            .create_offer(m.buyer, m.project, 55_000, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            NegotiationError::Validation(ValidationError::DuplicateActiveOffer { existing })
                if existing == first.id
        ));

        m.negotiation.reject_offer(m.seller, first.id).await.unwrap();

        // No hold was ever placed, and a fresh root can open.
        assert_eq!(m.processor.hold_count(), 0);
        m.negotiation
            .create_offer(m.buyer, m.project, 55_000, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_double_accept_holds_once() {
        let m = Marketplace::new();

        let root = m
            .negotiation
            .create_offer(m.buyer, m.project, 50_000, None)
            .await
            .unwrap();
        m.negotiation.accept_offer(m.seller, root.id).await.unwrap();

        let err = m.negotiation.accept_offer(m.seller, root.id).await.unwrap_err();
        assert!(matches!(
            err,
            NegotiationError::Validation(ValidationError::StaleStatus { .. })
        ));
        assert_eq!(m.processor.hold_count(), 1);
        assert_eq!(m.transactions.len(), 1);
    }

    #[tokio::test]
    async fn test_negotiations_on_separate_projects_are_independent() {
        let m = Marketplace::new();
        let second_project = m.list_project(40_000);

        let a = m
            .negotiation
            .create_offer(m.buyer, m.project, 50_000, None)
            .await
            .unwrap();
        let b = m
            .negotiation
            .create_offer(m.buyer, second_project, 20_000, None)
            .await
            .unwrap();

        m.negotiation.accept_offer(m.seller, a.id).await.unwrap();
        m.negotiation.accept_offer(m.seller, b.id).await.unwrap();

        assert_eq!(m.processor.hold_count(), 2);
    }

    #[tokio::test]
    async fn test_visibility_is_scoped_to_parties_end_to_end() {
        let m = Marketplace::new();
        let outsider = marketplace_types::UserId::generate();

        let root = m
            .negotiation
            .create_offer(m.buyer, m.project, 50_000, None)
            .await
            .unwrap();
        let accepted = m.negotiation.accept_offer(m.seller, root.id).await.unwrap();
        let txn_id = accepted.transaction_id.unwrap();

        // Neither the offer nor the transaction admits existence to an
        // outsider.
        let err = m.negotiation.get_offer(outsider, root.id).await.unwrap_err();
        assert!(matches!(err, NegotiationError::OfferNotFound(_)));

        let err = m.settlement.get_transaction(outsider, txn_id).await.unwrap_err();
        assert!(matches!(
            err,
            settlement_bridge::SettlementError::TransactionNotFound(_)
        ));

        // Both parties see both records.
        m.negotiation.get_offer(m.buyer, root.id).await.unwrap();
        m.settlement.get_transaction(m.seller, txn_id).await.unwrap();
    }
}
