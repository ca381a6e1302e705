//! # Adapters
//!
//! Concrete bindings for the outbound ports that ship with this crate.

pub mod memory_store;

pub use memory_store::InMemoryOfferStore;
