//! # Ports
//!
//! Inbound: the `SettlementApi` trait callers drive.
//! Outbound: the payment processor, transaction store, and admin directory
//! the bridge requires the host to bind.

pub mod inbound;
pub mod outbound;

pub use inbound::SettlementApi;
pub use outbound::{
    AdminDirectory, DirectoryError, InMemoryAdminDirectory, PaymentProcessor, ProcessorError,
    RecordingPaymentProcessor, TransactionStore, TxStoreError,
};
