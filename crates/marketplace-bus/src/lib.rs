//! # Marketplace Bus - Audit & Notification Event Bus
//!
//! In-process event bus carrying audit records and buyer/seller notifications
//! emitted by the negotiation engine and the settlement bridge.
//!
//! ## Fire-and-Forget Contract
//!
//! Publishers emit events *after* their controlling state transition commits.
//! Delivery is best-effort: a publish with zero receivers, a lagged
//! subscriber, or a closed channel is logged and discarded. A failure on this
//! bus must never make a committed transition appear failed to the caller.
//!
//! ```text
//! ┌─────────────────┐                     ┌──────────────────┐
//! │ Negotiation     │                     │ Audit consumer   │
//! │ Engine          │    publish()        │ (compliance log) │
//! │                 │ ──────┐             └──────────────────┘
//! └─────────────────┘       ▼                      ↑
//! ┌─────────────────┐ ┌──────────────┐             │
//! │ Settlement      │ │  Event Bus   │ ────────────┘
//! │ Bridge          │ │              │ ────────────┐
//! └─────────────────┘ └──────────────┘  subscribe()▼
//!                                       ┌──────────────────┐
//!                                       │ Notifier (email, │
//!                                       │ push, in-app)    │
//!                                       └──────────────────┘
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{
    AuditAction, AuditRecord, AuditTarget, EventFilter, EventTopic, MarketplaceEvent,
    NotificationKind, NotificationMessage,
};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
