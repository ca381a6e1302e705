//! # Identifiers
//!
//! Newtype wrappers over `Uuid` for every entity that crosses a crate
//! boundary. Offer ids use UUIDv7 so lexicographic order matches creation
//! order; everything else uses UUIDv4.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident, $ctor:ident) => {
        $(#[$doc])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::$ctor())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// The underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

define_id!(
    /// Identifies a single offer node in a negotiation chain.
    ///
    /// UUIDv7: timestamp-prefixed, so sorting by id sorts by creation time.
    /// This is what makes "order by id" equivalent to "order by created_at"
    /// in the store's paginated queries.
    OfferId,
    now_v7
);

define_id!(
    /// Identifies a project listing.
    ProjectId,
    new_v4
);

define_id!(
    /// Identifies a marketplace user (buyer, seller, or admin).
    UserId,
    new_v4
);

define_id!(
    /// Identifies an escrow transaction created by the settlement bridge.
    TransactionId,
    new_v4
);
