//! # Escrow Settlement Bridge
//!
//! Holds the agreed amount when an offer is accepted, then settles it:
//! released to the seller or refunded to the buyer, each by administrator
//! override, each exactly once.
//!
//! ## Module Structure
//!
//! ```text
//! settlement-bridge/
//! ├── domain/     # Escrow transaction, status machine, errors
//! ├── ports/      # SettlementApi (inbound), processor/store/admins (outbound)
//! ├── adapters/   # In-memory store, negotiation gateway adapter
//! └── service/    # Bridge implementation
//! ```
//!
//! ## Idempotency Model
//!
//! Transactions are keyed by the offer they settle, and every processor
//! call carries an idempotency key. Retrying any operation after a fault
//! moves money at most once; the store's conditional transition makes
//! `Held` settle exactly once even under racing admins.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{EscrowSettlementGateway, InMemoryTransactionStore};
pub use domain::{EscrowStatus, EscrowTransaction, PaymentReference, SettlementError};
pub use ports::{
    AdminDirectory, DirectoryError, InMemoryAdminDirectory, PaymentProcessor, ProcessorError,
    RecordingPaymentProcessor, SettlementApi, TransactionStore, TxStoreError,
};
pub use service::SettlementService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
