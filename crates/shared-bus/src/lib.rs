//! # Shared Bus - In-Process Event Bus
//!
//! Subsystems announce facts ("a dataset was ingested", "a subscription was
//! removed") on the bus instead of calling the runtime directly. The runtime
//! owns the handlers that react to them, which keeps the API facade free of
//! delivery scheduling.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │  Node API    │                    │   Runtime    │
//! │  (tw-08)     │    publish()       │   handlers   │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! Delivery is best effort: an event published while nobody listens is
//! dropped, and a subscriber that falls behind the channel capacity skips
//! the events it missed. `Subscription::recv_with_lag` reports such gaps so
//! the reader can catch up from the owning subsystem.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, NodeEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventSubscriber, Received, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before it starts lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
