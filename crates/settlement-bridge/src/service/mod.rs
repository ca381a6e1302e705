//! # Settlement Service
//!
//! Implements [`SettlementApi`](crate::ports::inbound::SettlementApi) over
//! injected outbound ports. Financial state changes commit against the
//! store before any event is published.

mod settlement;

use crate::domain::{EscrowStatus, EscrowTransaction, SettlementError};
use crate::ports::outbound::{
    AdminDirectory, DirectoryError, PaymentProcessor, ProcessorError, TransactionStore,
    TxStoreError,
};
use marketplace_bus::{
    AuditAction, AuditRecord, AuditTarget, EventPublisher, MarketplaceEvent, NotificationKind,
    NotificationMessage,
};
use marketplace_types::{TransactionId, UserId};
use offer_negotiation::TimeSource;
use std::sync::Arc;
use tracing::{error, warn};

/// The escrow settlement bridge.
///
/// Stateless apart from its injected dependencies. The processor and the
/// store are both idempotent-keyed, so any operation can be retried after
/// a fault without moving money twice.
pub struct SettlementService<S, P, A, T>
where
    S: TransactionStore,
    P: PaymentProcessor,
    A: AdminDirectory,
    T: TimeSource,
{
    store: Arc<S>,
    processor: Arc<P>,
    admins: Arc<A>,
    clock: Arc<T>,
    bus: Arc<dyn EventPublisher>,
}

impl<S, P, A, T> SettlementService<S, P, A, T>
where
    S: TransactionStore,
    P: PaymentProcessor,
    A: AdminDirectory,
    T: TimeSource,
{
    /// Create a service with the given dependencies.
    pub fn new(
        store: Arc<S>,
        processor: Arc<P>,
        admins: Arc<A>,
        clock: Arc<T>,
        bus: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            store,
            processor,
            admins,
            clock,
            bus,
        }
    }

    pub(crate) async fn require_admin(&self, user_id: UserId) -> Result<(), SettlementError> {
        let is_admin = self
            .admins
            .is_admin(user_id)
            .await
            .map_err(Self::map_directory_error)?;
        if !is_admin {
            return Err(SettlementError::Unauthorized);
        }
        Ok(())
    }

    pub(crate) async fn load_held(
        &self,
        transaction_id: TransactionId,
    ) -> Result<EscrowTransaction, SettlementError> {
        let txn = self
            .store
            .find_by_id(transaction_id)
            .await
            .map_err(Self::map_store_error)?
            .ok_or(SettlementError::TransactionNotFound(transaction_id))?;

        if txn.status != EscrowStatus::Held {
            return Err(SettlementError::InvalidState {
                expected: EscrowStatus::Held,
                actual: txn.status,
            });
        }
        Ok(txn)
    }

    // -------------------------------------------------------------------------
    // Error mapping
    // -------------------------------------------------------------------------

    pub(crate) fn map_store_error(err: TxStoreError) -> SettlementError {
        match err {
            TxStoreError::NotFound(id) => SettlementError::TransactionNotFound(id),
            TxStoreError::StaleStatus {
                expected, actual, ..
            } => SettlementError::InvalidState { expected, actual },
            TxStoreError::Backend(msg) => {
                error!(error = %msg, "Transaction store failure");
                SettlementError::Internal(msg)
            }
        }
    }

    pub(crate) fn map_processor_error(err: &ProcessorError) -> SettlementError {
        error!(error = %err, "Payment processor failure");
        SettlementError::Processor(err.to_string())
    }

    fn map_directory_error(err: DirectoryError) -> SettlementError {
        error!(error = %err, "Admin directory failure");
        SettlementError::Internal(err.to_string())
    }

    // -------------------------------------------------------------------------
    // Fire-and-forget side effects
    // -------------------------------------------------------------------------

    /// Publish an audit record after the financial state change commits.
    /// Bus failure is logged, never propagated.
    pub(crate) async fn audit(
        &self,
        actor_id: Option<UserId>,
        action: AuditAction,
        transaction_id: TransactionId,
        metadata: serde_json::Value,
    ) {
        let receivers = self
            .bus
            .publish(MarketplaceEvent::Audit(AuditRecord {
                actor_id,
                action,
                target: AuditTarget::Transaction(transaction_id),
                metadata,
            }))
            .await;
        if receivers == 0 {
            warn!(?action, %transaction_id, "Audit record had no consumers");
        }
    }

    /// Notify both negotiating parties, same contract as [`Self::audit`].
    pub(crate) async fn notify_parties(
        &self,
        txn: &EscrowTransaction,
        kind: NotificationKind,
        payload: serde_json::Value,
    ) {
        for recipient in [txn.buyer_id, txn.seller_id] {
            self.bus
                .publish(MarketplaceEvent::Notification(
                    NotificationMessage::new(recipient, kind).with_payload(payload.clone()),
                ))
                .await;
        }
    }

    pub(crate) fn clock_now(&self) -> marketplace_types::Timestamp {
        self.clock.now()
    }
}
