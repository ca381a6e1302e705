//! # In-Memory Offer Store
//!
//! Reference implementation of the [`OfferStore`] port.
//!
//! Every mutation runs under one write lock, which is what makes the
//! conditional update and the counter pair-write atomic here. A relational
//! adapter gets the same guarantees from `UPDATE ... WHERE status = $expected`
//! and a transaction around the counter pair, plus a partial unique index on
//! active root offers per (buyer, project).

use crate::domain::{Offer, OfferStatus};
use crate::ports::outbound::{OfferStore, StoreError};
use async_trait::async_trait;
use marketplace_types::{OfferId, Page, PageRequest, ProjectId, Timestamp, TransactionId, UserId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// In-memory offer store for tests and single-node operation.
#[derive(Default)]
pub struct InMemoryOfferStore {
    offers: RwLock<HashMap<OfferId, Offer>>,
    /// Failure injection: the next `counter_transition` fails before
    /// touching any state, proving the all-or-nothing contract.
    fail_next_counter: AtomicBool,
}

impl InMemoryOfferStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next counter transition fail without mutating anything.
    pub fn inject_counter_failure(&self) {
        self.fail_next_counter.store(true, Ordering::SeqCst);
    }

    /// Total rows, across all statuses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offers.read().map(|o| o.len()).unwrap_or(0)
    }

    /// Whether the store holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn paginate(mut matches: Vec<Offer>, page: PageRequest) -> Page<Offer> {
        // UUIDv7 ids sort by creation time, so id order is creation order.
        matches.sort_by_key(|o| o.id);
        let total = matches.len();
        let items = matches
            .into_iter()
            .skip(page.offset)
            .take(page.effective_limit())
            .collect();
        Page {
            items,
            total,
            offset: page.offset,
        }
    }

    fn filtered<F>(&self, status: Option<OfferStatus>, predicate: F) -> Result<Vec<Offer>, StoreError>
    where
        F: Fn(&Offer) -> bool,
    {
        let offers = self
            .offers
            .read()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(offers
            .values()
            .filter(|o| predicate(o) && status.is_none_or(|s| o.status == s))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OfferStore for InMemoryOfferStore {
    async fn insert_root(&self, offer: Offer) -> Result<(), StoreError> {
        let mut offers = self
            .offers
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        // The relational analog: partial unique index over active roots.
        if let Some(existing) = offers.values().find(|o| {
            o.is_root()
                && o.is_active()
                && o.buyer_id == offer.buyer_id
                && o.project_id == offer.project_id
        }) {
            return Err(StoreError::ActiveOfferExists {
                existing: existing.id,
            });
        }

        offers.insert(offer.id, offer);
        Ok(())
    }

    async fn find_by_id(&self, id: OfferId) -> Result<Option<Offer>, StoreError> {
        let offers = self
            .offers
            .read()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(offers.get(&id).cloned())
    }

    async fn find_by_buyer(
        &self,
        buyer_id: UserId,
        status: Option<OfferStatus>,
        page: PageRequest,
    ) -> Result<Page<Offer>, StoreError> {
        let matches = self.filtered(status, |o| o.buyer_id == buyer_id)?;
        Ok(Self::paginate(matches, page))
    }

    async fn find_by_seller(
        &self,
        seller_id: UserId,
        status: Option<OfferStatus>,
        page: PageRequest,
    ) -> Result<Page<Offer>, StoreError> {
        let matches = self.filtered(status, |o| o.seller_id == seller_id)?;
        Ok(Self::paginate(matches, page))
    }

    async fn find_by_project(
        &self,
        project_id: ProjectId,
        status: Option<OfferStatus>,
        page: PageRequest,
    ) -> Result<Page<Offer>, StoreError> {
        let matches = self.filtered(status, |o| o.project_id == project_id)?;
        Ok(Self::paginate(matches, page))
    }

    async fn find_active_root_for_buyer(
        &self,
        buyer_id: UserId,
        project_id: ProjectId,
    ) -> Result<Option<Offer>, StoreError> {
        let matches = self.filtered(None, |o| {
            o.is_root() && o.is_active() && o.buyer_id == buyer_id && o.project_id == project_id
        })?;
        Ok(matches.into_iter().next())
    }

    async fn find_expired_eligible(&self, now: Timestamp) -> Result<Vec<Offer>, StoreError> {
        let mut eligible = self.filtered(None, |o| o.is_sweep_eligible(now))?;
        eligible.sort_by_key(|o| o.id);
        Ok(eligible)
    }

    async fn transition_status(
        &self,
        id: OfferId,
        expected: OfferStatus,
        next: OfferStatus,
        responded_at: Option<Timestamp>,
    ) -> Result<Offer, StoreError> {
        let mut offers = self
            .offers
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let offer = offers.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if offer.status != expected {
            return Err(StoreError::StaleStatus {
                offer_id: id,
                expected,
                actual: offer.status,
            });
        }

        offer.status = next;
        if let Some(ts) = responded_at {
            // Set exactly once: expiring an already-countered parent must
            // not overwrite its original response time.
            offer.responded_at.get_or_insert(ts);
        }
        Ok(offer.clone())
    }

    async fn counter_transition(
        &self,
        parent_id: OfferId,
        expected: OfferStatus,
        responded_at: Timestamp,
        child: Offer,
    ) -> Result<(Offer, Offer), StoreError> {
        if self.fail_next_counter.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Backend("injected transaction abort".to_string()));
        }

        let mut offers = self
            .offers
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        // Validate the parent before touching anything; both writes happen
        // under this single lock or not at all.
        let parent = offers
            .get_mut(&parent_id)
            .ok_or(StoreError::NotFound(parent_id))?;
        if parent.status != expected {
            return Err(StoreError::StaleStatus {
                offer_id: parent_id,
                expected,
                actual: parent.status,
            });
        }

        parent.status = OfferStatus::Countered;
        parent.responded_at.get_or_insert(responded_at);
        let updated_parent = parent.clone();

        let inserted_child = child.clone();
        offers.insert(child.id, child);

        Ok((updated_parent, inserted_child))
    }

    async fn link_transaction(
        &self,
        id: OfferId,
        transaction_id: TransactionId,
    ) -> Result<Offer, StoreError> {
        let mut offers = self
            .offers
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let offer = offers.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if offer.status != OfferStatus::Accepted {
            return Err(StoreError::NotAccepted(id));
        }

        offer.transaction_id = Some(transaction_id);
        Ok(offer.clone())
    }
}
