//! # Negotiation Gateway
//!
//! Binds the negotiation engine's settlement port to this bridge, so an
//! accepted offer's handoff is an in-process call.

use crate::ports::inbound::SettlementApi;
use crate::ports::outbound::{AdminDirectory, PaymentProcessor, TransactionStore};
use crate::service::SettlementService;
use crate::SettlementError;
use async_trait::async_trait;
use marketplace_types::{AcceptedOffer, TransactionId};
use offer_negotiation::{GatewayError, SettlementGateway, TimeSource};
use std::sync::Arc;

/// Adapter implementing the negotiation engine's [`SettlementGateway`] over
/// a [`SettlementService`].
///
/// Idempotency is inherited from the service: retried accepts resolve to
/// the same transaction.
pub struct EscrowSettlementGateway<S, P, A, T>
where
    S: TransactionStore,
    P: PaymentProcessor,
    A: AdminDirectory,
    T: TimeSource,
{
    service: Arc<SettlementService<S, P, A, T>>,
}

impl<S, P, A, T> EscrowSettlementGateway<S, P, A, T>
where
    S: TransactionStore,
    P: PaymentProcessor,
    A: AdminDirectory,
    T: TimeSource,
{
    /// Wrap a settlement service.
    pub fn new(service: Arc<SettlementService<S, P, A, T>>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<S, P, A, T> SettlementGateway for EscrowSettlementGateway<S, P, A, T>
where
    S: TransactionStore,
    P: PaymentProcessor,
    A: AdminDirectory,
    T: TimeSource,
{
    async fn create_transaction(
        &self,
        accepted: &AcceptedOffer,
    ) -> Result<TransactionId, GatewayError> {
        self.service
            .create_transaction_for_accepted_offer(accepted)
            .await
            .map(|txn| txn.id)
            .map_err(|e| match e {
                SettlementError::Processor(msg) => GatewayError::Processor(msg),
                other => GatewayError::Bridge(other.to_string()),
            })
    }
}
