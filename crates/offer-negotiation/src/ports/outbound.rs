//! # Outbound Ports (Driven Ports)
//!
//! Dependencies the negotiation engine requires the host application to
//! bind: the offer store, the project catalog, the user directory, the
//! settlement gateway, and the clock.

use crate::domain::{Offer, OfferStatus};
use async_trait::async_trait;
use marketplace_types::{
    AcceptedOffer, OfferId, Page, PageRequest, ProjectId, ProjectSummary, Timestamp,
    TransactionId, UserId, UserSummary,
};
use thiserror::Error;

/// Offer store failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No row with that id.
    #[error("offer not found: {0}")]
    NotFound(OfferId),

    /// Conditional update found the row in a different status. The loser of
    /// every transition race lands here.
    #[error("offer {offer_id} is {actual:?}, expected {expected:?}")]
    StaleStatus {
        /// The contested row.
        offer_id: OfferId,
        /// Status the update required.
        expected: OfferStatus,
        /// Status actually found.
        actual: OfferStatus,
    },

    /// Root insert hit the one-active-negotiation-per-(buyer, project)
    /// constraint (the relational analog is a partial unique index).
    #[error("buyer already has active offer {existing} on this project")]
    ActiveOfferExists {
        /// The root offer occupying the slot.
        existing: OfferId,
    },

    /// Linking a transaction to a row that is not `Accepted`.
    #[error("offer {0} is not accepted, cannot link a transaction")]
    NotAccepted(OfferId),

    /// Connection error, constraint violation, or other backend fault.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Abstract interface for offer persistence.
///
/// Pure persistence: no business validation lives behind this trait, only
/// referential shape and the conditional-update primitives the engine's
/// concurrency model is built on.
///
/// Production: a relational adapter where `transition_status` maps to
/// `UPDATE ... WHERE id = $1 AND status = $2`.
/// Testing: [`crate::adapters::InMemoryOfferStore`].
#[async_trait]
pub trait OfferStore: Send + Sync {
    /// Insert a root offer.
    ///
    /// Atomically enforces the uniqueness constraint: fails with
    /// [`StoreError::ActiveOfferExists`] if the buyer already has an active
    /// root offer on the project.
    async fn insert_root(&self, offer: Offer) -> Result<(), StoreError>;

    /// Fetch a single offer.
    async fn find_by_id(&self, id: OfferId) -> Result<Option<Offer>, StoreError>;

    /// Page through a buyer's offers, newest last, optionally filtered by
    /// status.
    async fn find_by_buyer(
        &self,
        buyer_id: UserId,
        status: Option<OfferStatus>,
        page: PageRequest,
    ) -> Result<Page<Offer>, StoreError>;

    /// Page through a seller's offers.
    async fn find_by_seller(
        &self,
        seller_id: UserId,
        status: Option<OfferStatus>,
        page: PageRequest,
    ) -> Result<Page<Offer>, StoreError>;

    /// Page through a project's offers.
    async fn find_by_project(
        &self,
        project_id: ProjectId,
        status: Option<OfferStatus>,
        page: PageRequest,
    ) -> Result<Page<Offer>, StoreError>;

    /// The buyer's active root offer on a project, if any.
    async fn find_active_root_for_buyer(
        &self,
        buyer_id: UserId,
        project_id: ProjectId,
    ) -> Result<Option<Offer>, StoreError>;

    /// Every active offer whose deadline is strictly before `now`.
    async fn find_expired_eligible(&self, now: Timestamp) -> Result<Vec<Offer>, StoreError>;

    /// Conditional status transition: the single-row compare-and-swap.
    ///
    /// Succeeds only if the row is currently in `expected`; otherwise fails
    /// with [`StoreError::StaleStatus`] and changes nothing. `responded_at`
    /// is recorded only if the row has not responded yet, preserving the
    /// set-exactly-once invariant when a countered parent is later expired.
    async fn transition_status(
        &self,
        id: OfferId,
        expected: OfferStatus,
        next: OfferStatus,
        responded_at: Option<Timestamp>,
    ) -> Result<Offer, StoreError>;

    /// The counter-offer write pair, atomically: transition the parent from
    /// `expected` to `Countered` and insert the pending child.
    ///
    /// Either both writes commit or neither does; a crash between them must
    /// not be observable.
    async fn counter_transition(
        &self,
        parent_id: OfferId,
        expected: OfferStatus,
        responded_at: Timestamp,
        child: Offer,
    ) -> Result<(Offer, Offer), StoreError>;

    /// Record the escrow transaction on an accepted offer.
    async fn link_transaction(
        &self,
        id: OfferId,
        transaction_id: TransactionId,
    ) -> Result<Offer, StoreError>;
}

/// Read-only collaborator lookup failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Backend fault in the catalog or directory.
    #[error("lookup backend failure: {0}")]
    Backend(String),
}

/// Read-only access to project listings - outbound port.
#[async_trait]
pub trait ProjectCatalog: Send + Sync {
    /// Fetch a project summary.
    async fn find_by_id(&self, id: ProjectId) -> Result<Option<ProjectSummary>, LookupError>;
}

/// Read-only access to user records - outbound port.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch a user summary.
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserSummary>, LookupError>;
}

/// Settlement gateway failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The payment processor declined or errored.
    #[error("payment processor failure: {0}")]
    Processor(String),

    /// The bridge itself faulted.
    #[error("settlement bridge failure: {0}")]
    Bridge(String),
}

/// Hand-off to the escrow settlement bridge - outbound port.
///
/// Implementations MUST be idempotent keyed by `accepted.offer_id`: calling
/// twice for the same offer returns the same transaction and places at most
/// one hold.
#[async_trait]
pub trait SettlementGateway: Send + Sync {
    /// Create (or return the existing) escrow transaction for an accepted
    /// offer.
    async fn create_transaction(
        &self,
        accepted: &AcceptedOffer,
    ) -> Result<TransactionId, GatewayError>;
}

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Get current timestamp in seconds since epoch.
    fn now(&self) -> Timestamp;
}

// =============================================================================
// ADAPTER IMPLEMENTATIONS
// Production binds these ports to the marketplace's relational store and
// payment processor. In-memory/mock implementations below and in `adapters`.
// =============================================================================

/// Default time source using system time.
#[derive(Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Manually-advanced clock for deterministic expiry tests.
#[derive(Default)]
pub struct ManualClock {
    now: std::sync::atomic::AtomicU64,
}

impl ManualClock {
    /// Start the clock at a fixed instant.
    #[must_use]
    pub fn starting_at(now: Timestamp) -> Self {
        Self {
            now: std::sync::atomic::AtomicU64::new(now),
        }
    }

    /// Jump forward.
    pub fn advance(&self, secs: u64) {
        self.now
            .fetch_add(secs, std::sync::atomic::Ordering::SeqCst);
    }

    /// Set the absolute time.
    pub fn set(&self, now: Timestamp) {
        self.now.store(now, std::sync::atomic::Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(std::sync::atomic::Ordering::SeqCst)
    }
}

/// In-memory project catalog for unit tests.
#[derive(Default)]
pub struct InMemoryProjectCatalog {
    projects: std::sync::RwLock<std::collections::HashMap<ProjectId, ProjectSummary>>,
}

impl InMemoryProjectCatalog {
    /// Register a project.
    pub fn insert(&self, id: ProjectId, summary: ProjectSummary) {
        if let Ok(mut projects) = self.projects.write() {
            projects.insert(id, summary);
        }
    }
}

#[async_trait]
impl ProjectCatalog for InMemoryProjectCatalog {
    async fn find_by_id(&self, id: ProjectId) -> Result<Option<ProjectSummary>, LookupError> {
        let projects = self
            .projects
            .read()
            .map_err(|e| LookupError::Backend(e.to_string()))?;
        Ok(projects.get(&id).cloned())
    }
}

/// In-memory user directory for unit tests.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: std::sync::RwLock<std::collections::HashMap<UserId, UserSummary>>,
}

impl InMemoryUserDirectory {
    /// Register a user, generating an id.
    pub fn add_user(&self, display_name: &str) -> UserId {
        let id = UserId::generate();
        if let Ok(mut users) = self.users.write() {
            users.insert(
                id,
                UserSummary {
                    id,
                    display_name: display_name.to_string(),
                },
            );
        }
        id
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserSummary>, LookupError> {
        let users = self
            .users
            .read()
            .map_err(|e| LookupError::Backend(e.to_string()))?;
        Ok(users.get(&id).cloned())
    }
}

/// Recording settlement gateway for unit tests.
///
/// Idempotent keyed by offer id, like the real bridge, and optionally
/// failing to exercise the engine's settlement-failure path.
#[derive(Default)]
pub struct RecordingSettlementGateway {
    transactions: std::sync::RwLock<std::collections::HashMap<OfferId, TransactionId>>,
    /// When true, every call fails with a processor error.
    pub should_fail: std::sync::atomic::AtomicBool,
}

impl RecordingSettlementGateway {
    /// Number of distinct offers settled so far.
    #[must_use]
    pub fn settled_count(&self) -> usize {
        self.transactions.read().map(|t| t.len()).unwrap_or(0)
    }

    /// The transaction created for an offer, if any.
    #[must_use]
    pub fn transaction_for(&self, offer_id: OfferId) -> Option<TransactionId> {
        self.transactions
            .read()
            .ok()
            .and_then(|t| t.get(&offer_id).copied())
    }

    /// Toggle failure injection.
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }
}

#[async_trait]
impl SettlementGateway for RecordingSettlementGateway {
    async fn create_transaction(
        &self,
        accepted: &AcceptedOffer,
    ) -> Result<TransactionId, GatewayError> {
        if self.should_fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(GatewayError::Processor("injected failure".to_string()));
        }

        let mut transactions = self
            .transactions
            .write()
            .map_err(|e| GatewayError::Bridge(e.to_string()))?;
        let id = *transactions
            .entry(accepted.offer_id)
            .or_insert_with(TransactionId::generate);
        Ok(id)
    }
}
