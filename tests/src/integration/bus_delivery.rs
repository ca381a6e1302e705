//! # Bus Delivery
//!
//! The audit trail and notification fan-out across a whole negotiation,
//! plus subscription filtering, streaming, and drop cleanup.

#[cfg(test)]
mod tests {
    use crate::support::Marketplace;

    use futures::StreamExt;
    use marketplace_bus::{
        AuditAction, EventFilter, EventPublisher, EventTopic, MarketplaceEvent, NotificationKind,
    };
    use offer_negotiation::NegotiationApi;
    use settlement_bridge::SettlementApi;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_audit_trail_covers_the_whole_lifecycle() {
        let m = Marketplace::new();
        let mut audits = m.bus.subscribe(EventFilter::topics(vec![EventTopic::Audit]));

        let root = m
            .negotiation
            .create_offer(m.buyer, m.project, 50_000, None)
            .await
            .unwrap();
        let counter = m
            .negotiation
            .counter_offer(m.seller, root.id, 75_000, None)
            .await
            .unwrap();
        let accepted = m.negotiation.accept_offer(m.buyer, counter.id).await.unwrap();
        m.settlement
            .manual_release(m.admin, accepted.transaction_id.unwrap())
            .await
            .unwrap();

        let actions: Vec<AuditAction> = audits
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                MarketplaceEvent::Audit(record) => Some(record.action),
                MarketplaceEvent::Notification(_) => None,
            })
            .collect();

        for expected in [
            AuditAction::OfferCreated,
            AuditAction::OfferCountered,
            AuditAction::TransactionHeld,
            AuditAction::OfferAccepted,
            AuditAction::FundsReleased,
        ] {
            assert!(actions.contains(&expected), "missing {expected:?} in {actions:?}");
        }

        // Creation precedes the counter, and the hold precedes the release.
        let pos = |a: AuditAction| actions.iter().position(|x| *x == a).unwrap();
        assert!(pos(AuditAction::OfferCreated) < pos(AuditAction::OfferCountered));
        assert!(pos(AuditAction::TransactionHeld) < pos(AuditAction::FundsReleased));
    }

    #[tokio::test]
    async fn test_notifications_are_filtered_per_recipient() {
        let m = Marketplace::new();
        let mut buyer_inbox = m.bus.subscribe(EventFilter::for_recipients(vec![m.buyer]));
        let mut seller_inbox = m.bus.subscribe(EventFilter::for_recipients(vec![m.seller]));

        let root = m
            .negotiation
            .create_offer(m.buyer, m.project, 50_000, None)
            .await
            .unwrap();
        m.negotiation
            .counter_offer(m.seller, root.id, 75_000, None)
            .await
            .unwrap();

        // The seller hears about the new offer, the buyer about the counter,
        // and neither sees the other's mail.
        let seller_kinds: Vec<NotificationKind> = seller_inbox
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                MarketplaceEvent::Notification(msg) => {
                    assert_eq!(msg.recipient_id, m.seller);
                    Some(msg.kind)
                }
                MarketplaceEvent::Audit(_) => None,
            })
            .collect();
        assert_eq!(seller_kinds, vec![NotificationKind::OfferReceived]);

        let buyer_kinds: Vec<NotificationKind> = buyer_inbox
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                MarketplaceEvent::Notification(msg) => Some(msg.kind),
                MarketplaceEvent::Audit(_) => None,
            })
            .collect();
        assert_eq!(buyer_kinds, vec![NotificationKind::CounterReceived]);
    }

    #[tokio::test]
    async fn test_event_stream_delivers_asynchronously() {
        let m = Marketplace::new();
        let mut stream = m.bus.event_stream(EventFilter::topics(vec![EventTopic::Audit]));

        m.negotiation
            .create_offer(m.buyer, m.project, 50_000, None)
            .await
            .unwrap();

        let event = timeout(Duration::from_millis(100), stream.next())
            .await
            .expect("timeout waiting for event")
            .expect("stream should yield an event");
        match event {
            MarketplaceEvent::Audit(record) => {
                assert_eq!(record.action, AuditAction::OfferCreated);
            }
            other => panic!("expected audit record, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_subscription_drop_cleans_up() {
        let m = Marketplace::new();
        assert_eq!(m.bus.subscriber_count(), 0);

        let first = m.bus.subscribe(EventFilter::all());
        let second = m.bus.subscribe(EventFilter::all());
        assert_eq!(m.bus.subscriber_count(), 2);

        drop(first);
        drop(second);
        assert_eq!(m.bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_publishing_never_blocks_on_zero_subscribers() {
        // A full flow with nobody listening: every transition still
        // commits, every publish is counted.
        let m = Marketplace::new();

        let root = m
            .negotiation
            .create_offer(m.buyer, m.project, 50_000, None)
            .await
            .unwrap();
        let accepted = m.negotiation.accept_offer(m.seller, root.id).await.unwrap();
        m.settlement
            .manual_release(m.admin, accepted.transaction_id.unwrap())
            .await
            .unwrap();

        assert!(m.bus.events_published() >= 5);
    }
}
