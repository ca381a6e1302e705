//! # Outbound Ports (Driven Ports)
//!
//! Dependencies the settlement bridge requires the host application to
//! bind: the payment processor, the transaction store, and the admin
//! directory.

use crate::domain::{EscrowStatus, EscrowTransaction, PaymentReference};
use async_trait::async_trait;
use marketplace_types::{Cents, OfferId, Timestamp, TransactionId, UserId};
use thiserror::Error;

/// Payment processor failures. In both cases no funds have moved.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProcessorError {
    /// The processor refused the operation (declined card, closed account).
    #[error("processor declined: {0}")]
    Declined(String),

    /// The processor could not be reached or errored.
    #[error("processor unavailable: {0}")]
    Unavailable(String),
}

/// Money movement - outbound port.
///
/// Every call MUST be idempotent on the processor side: `hold_funds` keyed
/// by `idempotency_key`, `release`/`refund` keyed by the reference. Retrying
/// any of them moves money at most once.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Place a hold on the buyer's payment method.
    async fn hold_funds(
        &self,
        idempotency_key: &str,
        buyer_id: UserId,
        amount_cents: Cents,
    ) -> Result<PaymentReference, ProcessorError>;

    /// Release a hold to the seller.
    async fn release(&self, reference: &PaymentReference) -> Result<(), ProcessorError>;

    /// Return a hold to the buyer.
    async fn refund(
        &self,
        reference: &PaymentReference,
        reason: &str,
    ) -> Result<(), ProcessorError>;
}

/// Transaction store failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TxStoreError {
    /// No row with that id.
    #[error("transaction not found: {0}")]
    NotFound(TransactionId),

    /// Conditional update found the row in a different status.
    #[error("transaction {transaction_id} is {actual:?}, expected {expected:?}")]
    StaleStatus {
        /// The contested row.
        transaction_id: TransactionId,
        /// Status the update required.
        expected: EscrowStatus,
        /// Status actually found.
        actual: EscrowStatus,
    },

    /// Connection error, constraint violation, or other backend fault.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Abstract interface for escrow transaction persistence.
///
/// Same contract shape as the offer store: pure persistence plus the
/// conditional-update primitives the bridge's concurrency model needs.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Insert a transaction unless the offer already has one.
    ///
    /// Returns the row that is in the store afterwards: the given one, or
    /// the pre-existing row for the same offer (the relational analog is
    /// `INSERT ... ON CONFLICT (offer_id) DO NOTHING` plus a re-read).
    async fn insert_if_absent(
        &self,
        txn: EscrowTransaction,
    ) -> Result<EscrowTransaction, TxStoreError>;

    /// Fetch a single transaction.
    async fn find_by_id(&self, id: TransactionId)
        -> Result<Option<EscrowTransaction>, TxStoreError>;

    /// The transaction settling an offer, if any.
    async fn find_by_offer(
        &self,
        offer_id: OfferId,
    ) -> Result<Option<EscrowTransaction>, TxStoreError>;

    /// Conditional status transition.
    ///
    /// Succeeds only if the row is currently in `expected`; records
    /// `settled_at` and the optional note on success.
    async fn transition_status(
        &self,
        id: TransactionId,
        expected: EscrowStatus,
        next: EscrowStatus,
        settled_at: Timestamp,
        note: Option<String>,
    ) -> Result<EscrowTransaction, TxStoreError>;
}

/// Admin directory lookup failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// Backend fault in the directory.
    #[error("directory backend failure: {0}")]
    Backend(String),
}

/// Who may perform manual settlement - outbound port.
#[async_trait]
pub trait AdminDirectory: Send + Sync {
    /// Whether this user holds the administrator role.
    async fn is_admin(&self, user_id: UserId) -> Result<bool, DirectoryError>;
}

// =============================================================================
// ADAPTER IMPLEMENTATIONS
// Production binds these ports to the real processor and relational store.
// In-memory/mock implementations below and in `adapters`.
// =============================================================================

/// In-memory admin directory for unit tests.
#[derive(Default)]
pub struct InMemoryAdminDirectory {
    admins: std::sync::RwLock<std::collections::HashSet<UserId>>,
}

impl InMemoryAdminDirectory {
    /// Grant the administrator role.
    pub fn grant(&self, user_id: UserId) {
        if let Ok(mut admins) = self.admins.write() {
            admins.insert(user_id);
        }
    }
}

#[async_trait]
impl AdminDirectory for InMemoryAdminDirectory {
    async fn is_admin(&self, user_id: UserId) -> Result<bool, DirectoryError> {
        let admins = self
            .admins
            .read()
            .map_err(|e| DirectoryError::Backend(e.to_string()))?;
        Ok(admins.contains(&user_id))
    }
}

/// How a recorded hold was consumed.
#[derive(Clone, Debug, PartialEq, Eq)]
enum HoldSettlement {
    Released,
    Refunded(String),
}

/// Recording payment processor for unit tests.
///
/// Idempotent keyed by the hold's idempotency key, like a real processor,
/// and optionally failing to exercise the bridge's error paths. A consumed
/// hold settles in one direction only, like a real processor.
#[derive(Default)]
pub struct RecordingPaymentProcessor {
    holds: std::sync::RwLock<std::collections::HashMap<String, PaymentReference>>,
    settlements: std::sync::RwLock<std::collections::HashMap<PaymentReference, HoldSettlement>>,
    /// When true, every call fails as unavailable.
    pub should_fail: std::sync::atomic::AtomicBool,
}

impl RecordingPaymentProcessor {
    /// Number of distinct holds placed so far.
    #[must_use]
    pub fn hold_count(&self) -> usize {
        self.holds.read().map(|h| h.len()).unwrap_or(0)
    }

    /// Whether this hold was released.
    #[must_use]
    pub fn was_released(&self, reference: &PaymentReference) -> bool {
        self.settlements
            .read()
            .map(|s| s.get(reference) == Some(&HoldSettlement::Released))
            .unwrap_or(false)
    }

    /// The recorded refund reason for this hold, if any.
    #[must_use]
    pub fn refund_reason(&self, reference: &PaymentReference) -> Option<String> {
        self.settlements.read().ok().and_then(|s| match s.get(reference) {
            Some(HoldSettlement::Refunded(reason)) => Some(reason.clone()),
            _ => None,
        })
    }

    /// Toggle failure injection.
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), ProcessorError> {
        if self.should_fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(ProcessorError::Unavailable("injected failure".to_string()));
        }
        Ok(())
    }

    fn settle(
        &self,
        reference: &PaymentReference,
        settlement: HoldSettlement,
    ) -> Result<(), ProcessorError> {
        let mut settlements = self
            .settlements
            .write()
            .map_err(|e| ProcessorError::Unavailable(e.to_string()))?;
        match settlements.get(reference) {
            // Idempotent replay of the same settlement.
            Some(existing) if *existing == settlement => Ok(()),
            Some(HoldSettlement::Released) => {
                Err(ProcessorError::Declined("hold already released".to_string()))
            }
            Some(HoldSettlement::Refunded(_)) => {
                Err(ProcessorError::Declined("hold already refunded".to_string()))
            }
            None => {
                settlements.insert(reference.clone(), settlement);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl PaymentProcessor for RecordingPaymentProcessor {
    async fn hold_funds(
        &self,
        idempotency_key: &str,
        _buyer_id: UserId,
        _amount_cents: Cents,
    ) -> Result<PaymentReference, ProcessorError> {
        self.check_available()?;
        let mut holds = self
            .holds
            .write()
            .map_err(|e| ProcessorError::Unavailable(e.to_string()))?;
        let reference = holds
            .entry(idempotency_key.to_string())
            .or_insert_with(|| PaymentReference(format!("pay_{}", uuid::Uuid::new_v4())));
        Ok(reference.clone())
    }

    async fn release(&self, reference: &PaymentReference) -> Result<(), ProcessorError> {
        self.check_available()?;
        self.settle(reference, HoldSettlement::Released)
    }

    async fn refund(
        &self,
        reference: &PaymentReference,
        reason: &str,
    ) -> Result<(), ProcessorError> {
        self.check_available()?;
        self.settle(reference, HoldSettlement::Refunded(reason.to_string()))
    }
}
