//! # Expiry
//!
//! The sweep under a shared manual clock: the 7-day walkthrough, strict
//! deadlines, and idempotent re-runs.

#[cfg(test)]
mod tests {
    use crate::support::{Marketplace, DAY, START};

    use offer_negotiation::{
        NegotiationApi, NegotiationError, OfferStatus, OfferStore, ValidationError,
    };

    #[tokio::test]
    async fn test_seven_day_expiry_walkthrough() {
        // An offer created on day 0 and never answered is swept on day 8;
        // a second sweep on day 9 finds nothing.
        let m = Marketplace::new();

        let root = m
            .negotiation
            .create_offer(m.buyer, m.project, 50_000, None)
            .await
            .unwrap();
        assert_eq!(root.expires_at, START + 7 * DAY);

        m.clock.set(START + 8 * DAY);
        let report = m.negotiation.expire_offers().await.unwrap();
        assert_eq!(report.examined, 1);
        assert_eq!(report.expired, 1);

        let expired = m.offers.find_by_id(root.id).await.unwrap().unwrap();
        assert_eq!(expired.status, OfferStatus::Expired);

        m.clock.set(START + 9 * DAY);
        let report = m.negotiation.expire_offers().await.unwrap();
        assert_eq!(report.examined, 0);
        assert_eq!(report.expired, 0);
    }

    #[tokio::test]
    async fn test_expired_offer_cannot_be_accepted() {
        let m = Marketplace::new();

        let root = m
            .negotiation
            .create_offer(m.buyer, m.project, 50_000, None)
            .await
            .unwrap();
        m.clock.advance(8 * DAY);
        m.negotiation.expire_offers().await.unwrap();

        let err = m.negotiation.accept_offer(m.seller, root.id).await.unwrap_err();
        assert!(matches!(
            err,
            NegotiationError::Validation(ValidationError::StaleStatus {
                actual: OfferStatus::Expired,
                ..
            })
        ));
        assert_eq!(m.processor.hold_count(), 0);
    }

    #[tokio::test]
    async fn test_counter_restarts_the_window_per_node() {
        let m = Marketplace::new();

        let root = m
            .negotiation
            .create_offer(m.buyer, m.project, 50_000, None)
            .await
            .unwrap();

        // Day 6: the seller counters, opening a fresh 7-day window on the
        // child while the root's own deadline keeps running.
        m.clock.set(START + 6 * DAY);
        let counter = m
            .negotiation
            .counter_offer(m.seller, root.id, 75_000, None)
            .await
            .unwrap();
        assert_eq!(counter.expires_at, START + 13 * DAY);

        // Day 8: only the countered root is past due.
        m.clock.set(START + 8 * DAY);
        let report = m.negotiation.expire_offers().await.unwrap();
        assert_eq!(report.expired, 1);

        let child = m.offers.find_by_id(counter.id).await.unwrap().unwrap();
        assert_eq!(child.status, OfferStatus::Pending);

        // The chain is still concludable after the parent expired.
        m.negotiation.accept_offer(m.buyer, counter.id).await.unwrap();
        assert_eq!(m.processor.hold_count(), 1);
    }

    #[tokio::test]
    async fn test_sweep_reaches_every_open_negotiation() {
        let m = Marketplace::new();

        // Three buyers, three stale offers.
        let mut offers = Vec::new();
        for price in [20_000, 30_000, 40_000] {
            let project = m.list_project(50_000);
            offers.push(
                m.negotiation
                    .create_offer(m.buyer, project, price, None)
                    .await
                    .unwrap(),
            );
        }

        m.clock.advance(8 * DAY);
        let report = m.negotiation.expire_offers().await.unwrap();
        assert_eq!(report.expired, 3);

        for offer in offers {
            let row = m.offers.find_by_id(offer.id).await.unwrap().unwrap();
            assert_eq!(row.status, OfferStatus::Expired);
        }
    }
}
