//! # Adapters
//!
//! In-memory transaction store and the gateway adapter that plugs the
//! bridge into the negotiation engine's settlement port.

pub mod memory_store;
pub mod negotiation_gateway;

pub use memory_store::InMemoryTransactionStore;
pub use negotiation_gateway::EscrowSettlementGateway;
