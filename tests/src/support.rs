//! # Test Fixtures
//!
//! A fully-wired marketplace: the negotiation engine bound to the real
//! settlement bridge through the gateway adapter, sharing one event bus
//! and one manual clock.

use std::sync::Arc;

use marketplace_bus::InMemoryEventBus;
use marketplace_types::{Cents, ProjectId, ProjectStatus, ProjectSummary, UserId};
use offer_negotiation::{
    InMemoryOfferStore, InMemoryProjectCatalog, InMemoryUserDirectory, ManualClock,
    NegotiationService,
};
use settlement_bridge::{
    EscrowSettlementGateway, InMemoryAdminDirectory, InMemoryTransactionStore,
    RecordingPaymentProcessor, SettlementService,
};

/// Seconds per day.
pub const DAY: u64 = 86_400;
/// Fixture epoch.
pub const START: u64 = 1_700_000_000;
/// Listed price of the fixture project: $1000.
pub const LISTED_PRICE: Cents = 100_000;

/// Settlement service over the in-memory adapters.
pub type TestSettlementService = SettlementService<
    InMemoryTransactionStore,
    RecordingPaymentProcessor,
    InMemoryAdminDirectory,
    ManualClock,
>;

/// Gateway adapter bridging the two services.
pub type TestGateway = EscrowSettlementGateway<
    InMemoryTransactionStore,
    RecordingPaymentProcessor,
    InMemoryAdminDirectory,
    ManualClock,
>;

/// Negotiation engine wired to the real bridge.
pub type TestNegotiationService = NegotiationService<
    InMemoryOfferStore,
    InMemoryProjectCatalog,
    InMemoryUserDirectory,
    TestGateway,
    ManualClock,
>;

/// Everything a cross-crate test needs, pre-wired.
pub struct Marketplace {
    pub negotiation: Arc<TestNegotiationService>,
    pub settlement: Arc<TestSettlementService>,
    pub offers: Arc<InMemoryOfferStore>,
    pub transactions: Arc<InMemoryTransactionStore>,
    pub processor: Arc<RecordingPaymentProcessor>,
    pub catalog: Arc<InMemoryProjectCatalog>,
    pub clock: Arc<ManualClock>,
    pub bus: Arc<InMemoryEventBus>,
    pub buyer: UserId,
    pub seller: UserId,
    pub admin: UserId,
    pub project: ProjectId,
}

impl Marketplace {
    /// Wire a marketplace with one $1000 listing, a buyer, a seller, and
    /// an administrator.
    pub fn new() -> Self {
        marketplace_telemetry::try_init_for_tests();

        let bus = Arc::new(InMemoryEventBus::new());
        let clock = Arc::new(ManualClock::starting_at(START));

        let transactions = Arc::new(InMemoryTransactionStore::new());
        let processor = Arc::new(RecordingPaymentProcessor::default());
        let admins = Arc::new(InMemoryAdminDirectory::default());
        let admin = UserId::generate();
        admins.grant(admin);

        let settlement = Arc::new(SettlementService::new(
            transactions.clone(),
            processor.clone(),
            admins,
            clock.clone(),
            bus.clone(),
        ));

        let offers = Arc::new(InMemoryOfferStore::new());
        let catalog = Arc::new(InMemoryProjectCatalog::default());
        let directory = Arc::new(InMemoryUserDirectory::default());
        let buyer = directory.add_user("ada");
        let seller = directory.add_user("grace");

        let project = ProjectId::generate();
        catalog.insert(
            project,
            ProjectSummary {
                seller_id: seller,
                title: "rust web crawler".to_string(),
                price_cents: LISTED_PRICE,
                status: ProjectStatus::Active,
                minimum_offer_cents: None,
            },
        );

        let gateway = Arc::new(EscrowSettlementGateway::new(settlement.clone()));
        let negotiation = Arc::new(NegotiationService::with_defaults(
            offers.clone(),
            catalog.clone(),
            directory,
            gateway,
            clock.clone(),
            bus.clone(),
        ));

        Self {
            negotiation,
            settlement,
            offers,
            transactions,
            processor,
            catalog,
            clock,
            bus,
            buyer,
            seller,
            admin,
            project,
        }
    }

    /// Register another sellable project under the fixture seller.
    pub fn list_project(&self, price_cents: Cents) -> ProjectId {
        let id = ProjectId::generate();
        self.catalog.insert(
            id,
            ProjectSummary {
                seller_id: self.seller,
                title: "another project".to_string(),
                price_cents,
                status: ProjectStatus::Active,
                minimum_offer_cents: None,
            },
        );
        id
    }
}

impl Default for Marketplace {
    fn default() -> Self {
        Self::new()
    }
}
