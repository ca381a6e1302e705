//! # Settlement Domain
//!
//! The escrow transaction record and its status machine, plus the
//! caller-facing error taxonomy.

pub mod entities;
pub mod errors;

pub use entities::{EscrowStatus, EscrowTransaction, PaymentReference};
pub use errors::SettlementError;
