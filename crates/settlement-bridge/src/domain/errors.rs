//! # Settlement Errors
//!
//! Caller-facing taxonomy for the bridge. Financial operations either
//! succeed, fail a visible precondition, or surface an opaque fault with
//! full context logged.

use super::entities::EscrowStatus;
use marketplace_types::TransactionId;
use thiserror::Error;

/// Top-level error for every settlement operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettlementError {
    /// The transaction does not exist, or the caller may not see it.
    #[error("transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// Manual overrides are restricted to administrators.
    #[error("only administrators may settle escrow manually")]
    Unauthorized,

    /// The transaction is not in the status the operation requires. The
    /// loser of a release/refund race lands here.
    #[error("transaction is {actual:?}, expected {expected:?}")]
    InvalidState {
        /// Status the operation required.
        expected: EscrowStatus,
        /// Status actually found.
        actual: EscrowStatus,
    },

    /// The payment processor declined or errored. The financial state is
    /// unchanged.
    #[error("payment processor failure: {0}")]
    Processor(String),

    /// A persistence or directory fault. Full context is logged.
    #[error("internal error: {0}")]
    Internal(String),
}
