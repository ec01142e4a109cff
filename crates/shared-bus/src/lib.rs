//! # Shared Bus - Match Notification Channel
//!
//! In-process event bus that carries match lifecycle events from the
//! consensus engine to whoever delivers them to the counter-party.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────────┐                    ┌──────────────────┐
//! │ Consensus engine │                    │ Delivery adapter │
//! │                  │    publish()       │ (push, e-mail,   │
//! │                  │ ──────┐            │  websocket...)   │
//! └──────────────────┘       │            └──────────────────┘
//!                            ▼                    ↑
//!                      ┌──────────────┐           │
//!                      │  Event Bus   │ ──────────┘
//!                      └──────────────┘  subscribe(filter)
//! ```
//!
//! Events are published only after the underlying state change has been
//! committed. A dropped event never affects the committed state.

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
pub use events::{EventFilter, EventTopic, MatchEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging subscribers drop events.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
