//! # In-Memory Transaction Store
//!
//! Reference implementation of the [`TransactionStore`] port.
//!
//! Every mutation runs under one write lock, making the insert-if-absent
//! and the conditional transition atomic here. A relational adapter gets
//! the same guarantees from a unique index on `offer_id` and
//! `UPDATE ... WHERE status = $expected`.

use crate::domain::{EscrowStatus, EscrowTransaction};
use crate::ports::outbound::{TransactionStore, TxStoreError};
use async_trait::async_trait;
use marketplace_types::{OfferId, Timestamp, TransactionId};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory transaction store for tests and single-node operation.
#[derive(Default)]
pub struct InMemoryTransactionStore {
    rows: RwLock<HashMap<TransactionId, EscrowTransaction>>,
}

impl InMemoryTransactionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total rows, across all statuses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().map(|r| r.len()).unwrap_or(0)
    }

    /// Whether the store holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn insert_if_absent(
        &self,
        txn: EscrowTransaction,
    ) -> Result<EscrowTransaction, TxStoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|e| TxStoreError::Backend(e.to_string()))?;

        // The relational analog: unique index on offer_id.
        if let Some(existing) = rows.values().find(|t| t.offer_id == txn.offer_id) {
            return Ok(existing.clone());
        }

        rows.insert(txn.id, txn.clone());
        Ok(txn)
    }

    async fn find_by_id(
        &self,
        id: TransactionId,
    ) -> Result<Option<EscrowTransaction>, TxStoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|e| TxStoreError::Backend(e.to_string()))?;
        Ok(rows.get(&id).cloned())
    }

    async fn find_by_offer(
        &self,
        offer_id: OfferId,
    ) -> Result<Option<EscrowTransaction>, TxStoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|e| TxStoreError::Backend(e.to_string()))?;
        Ok(rows.values().find(|t| t.offer_id == offer_id).cloned())
    }

    async fn transition_status(
        &self,
        id: TransactionId,
        expected: EscrowStatus,
        next: EscrowStatus,
        settled_at: Timestamp,
        note: Option<String>,
    ) -> Result<EscrowTransaction, TxStoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|e| TxStoreError::Backend(e.to_string()))?;
        let txn = rows.get_mut(&id).ok_or(TxStoreError::NotFound(id))?;

        if txn.status != expected {
            return Err(TxStoreError::StaleStatus {
                transaction_id: id,
                expected,
                actual: txn.status,
            });
        }

        txn.status = next;
        txn.settled_at = Some(settled_at);
        txn.settlement_note = note;
        Ok(txn.clone())
    }
}
