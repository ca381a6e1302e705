//! # Concurrency
//!
//! Transition races across the whole stack. Every race must produce
//! exactly one winner and at most one escrow hold.

#[cfg(test)]
mod tests {
    use crate::support::{Marketplace, DAY};

    use offer_negotiation::{NegotiationApi, OfferStatus, OfferStore};

    const ROUNDS: usize = 25;

    #[tokio::test]
    async fn test_accept_vs_withdraw_race() {
        for _ in 0..ROUNDS {
            let m = Marketplace::new();
            let root = m
                .negotiation
                .create_offer(m.buyer, m.project, 50_000, None)
                .await
                .unwrap();

            let accept = {
                let n = m.negotiation.clone();
                let seller = m.seller;
                tokio::spawn(async move { n.accept_offer(seller, root.id).await })
            };
            let withdraw = {
                let n = m.negotiation.clone();
                let buyer = m.buyer;
                tokio::spawn(async move { n.withdraw_offer(buyer, root.id).await })
            };

            let accept = accept.await.unwrap();
            let withdraw = withdraw.await.unwrap();
            assert_ne!(accept.is_ok(), withdraw.is_ok());

            let row = m.offers.find_by_id(root.id).await.unwrap().unwrap();
            match row.status {
                OfferStatus::Accepted => {
                    assert_eq!(m.processor.hold_count(), 1);
                    assert!(row.transaction_id.is_some());
                }
                OfferStatus::Withdrawn => {
                    assert_eq!(m.processor.hold_count(), 0);
                    assert!(row.transaction_id.is_none());
                }
                other => panic!("offer ended in {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_double_accept_race_holds_once() {
        for _ in 0..ROUNDS {
            let m = Marketplace::new();
            let root = m
                .negotiation
                .create_offer(m.buyer, m.project, 50_000, None)
                .await
                .unwrap();

            let mut handles = Vec::new();
            for _ in 0..4 {
                let n = m.negotiation.clone();
                let seller = m.seller;
                handles.push(tokio::spawn(
                    async move { n.accept_offer(seller, root.id).await },
                ));
            }

            let mut wins = 0;
            for handle in handles {
                if handle.await.unwrap().is_ok() {
                    wins += 1;
                }
            }
            assert_eq!(wins, 1);
            assert_eq!(m.processor.hold_count(), 1);
            assert_eq!(m.transactions.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_duplicate_root_offer_race() {
        for _ in 0..ROUNDS {
            let m = Marketplace::new();

            let first = {
                let n = m.negotiation.clone();
                let (buyer, project) = (m.buyer, m.project);
                tokio::spawn(async move { n.create_offer(buyer, project, 50_000, None).await })
            };
            let second = {
                let n = m.negotiation.clone();
                let (buyer, project) = (m.buyer, m.project);
                tokio::spawn(async move { n.create_offer(buyer, project, 60_000, None).await })
            };

            let first = first.await.unwrap();
            let second = second.await.unwrap();

            // The store's uniqueness constraint is the last line of
            // defense, so exactly one root lands.
            assert_ne!(first.is_ok(), second.is_ok());
            assert_eq!(m.offers.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_sweep_vs_accept_race() {
        for _ in 0..ROUNDS {
            let m = Marketplace::new();
            let root = m
                .negotiation
                .create_offer(m.buyer, m.project, 50_000, None)
                .await
                .unwrap();
            m.clock.advance(8 * DAY);

            let accept = {
                let n = m.negotiation.clone();
                let seller = m.seller;
                tokio::spawn(async move { n.accept_offer(seller, root.id).await })
            };
            let sweep = {
                let n = m.negotiation.clone();
                tokio::spawn(async move { n.expire_offers().await })
            };

            let accept = accept.await.unwrap();
            let report = sweep.await.unwrap().unwrap();

            let row = m.offers.find_by_id(root.id).await.unwrap().unwrap();
            match row.status {
                OfferStatus::Accepted => {
                    assert!(accept.is_ok());
                    assert_eq!(report.expired, 0);
                    assert_eq!(m.processor.hold_count(), 1);
                }
                OfferStatus::Expired => {
                    assert!(accept.is_err());
                    assert_eq!(report.expired, 1);
                    assert_eq!(m.processor.hold_count(), 0);
                }
                other => panic!("offer ended in {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_release_vs_refund_race_settles_once() {
        for _ in 0..ROUNDS {
            let m = Marketplace::new();
            let root = m
                .negotiation
                .create_offer(m.buyer, m.project, 50_000, None)
                .await
                .unwrap();
            let accepted = m.negotiation.accept_offer(m.seller, root.id).await.unwrap();
            let txn_id = accepted.transaction_id.unwrap();

            let release = {
                let s = m.settlement.clone();
                let admin = m.admin;
                tokio::spawn(async move {
                    use settlement_bridge::SettlementApi;
                    s.manual_release(admin, txn_id).await
                })
            };
            let refund = {
                let s = m.settlement.clone();
                let admin = m.admin;
                tokio::spawn(async move {
                    use settlement_bridge::SettlementApi;
                    s.refund(admin, txn_id, "dispute".to_string()).await
                })
            };

            let release = release.await.unwrap();
            let refund = refund.await.unwrap();

            // Exactly one winner, and the hold settled in exactly one
            // direction at the processor.
            assert_ne!(release.is_ok(), refund.is_ok());
            let txn = {
                use settlement_bridge::SettlementApi;
                m.settlement.get_transaction(m.admin, txn_id).await.unwrap()
            };
            let released = m.processor.was_released(&txn.payment_reference);
            let refunded = m.processor.refund_reason(&txn.payment_reference).is_some();
            assert_ne!(released, refunded);
        }
    }
}
