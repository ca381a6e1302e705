//! # Shared Types Crate
//!
//! Cross-subsystem types for the Sourcemart marketplace: identifiers, money,
//! pagination, and the summary records exchanged between the negotiation
//! engine and the settlement bridge.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses a crate boundary is
//!   defined here.
//! - **Strongly-Typed Identifiers**: ids are newtypes over `Uuid`, so an
//!   `OfferId` can never be passed where a `UserId` is expected.
//! - **No Redundant Identity**: payload types never duplicate data the caller
//!   already carries (e.g. the seller id is derived from the project record,
//!   never supplied by the caller).

pub mod entities;
pub mod ids;
pub mod pagination;

pub use entities::*;
pub use ids::*;
pub use pagination::*;
