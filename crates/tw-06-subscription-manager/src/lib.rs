//! # Subscription Manager Subsystem (tw-06)
//!
//! Registers and removes the standing interests of remote nodes and finds
//! the subscriptions a published dataset must be delivered to.
//!
//! ## Rules
//!
//! | Rule | Enforcement |
//! |------|-------------|
//! | One subscription per node, repeat subscribe is idempotent | `SubscriptionRepository::insert_if_absent` |
//! | Only the owner may unsubscribe; others see `NotFound` | `SubscriptionManagerService::unsubscribe` |
//! | Unsupported product, version or container is `NotImplemented` | `SubscriptionManagerService::subscribe` |
//! | Elapsed subscriptions are never matched | `Subscription::is_active` |
//! | Notification failures are logged, never returned | `SubscriptionNotifier` |
//!
//! ## Hexagonal Architecture
//!
//! - **Domain Layer** (`domain/`): `Subscription`, `SubscriptionRequest`, `PublishedDataset`
//! - **Ports Layer** (`ports/`): `SubscriptionApi`, `SubscriberLookup` inbound;
//!   `SubscriptionRepository`, `SubscriptionNotifier` outbound
//! - **Adapters Layer** (`adapters/`): in-memory repository
//! - **Service** (`service.rs`): `SubscriptionManagerService`, `SubscriptionMatcher`

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::InMemorySubscriptionRepository;
pub use domain::{PublishedDataset, Subscription, SubscriptionError, SubscriptionRequest};
pub use ports::{SubscriberLookup, SubscriptionApi, SubscriptionNotifier, SubscriptionRepository};
pub use service::{SubscriptionManagerService, SubscriptionMatcher};
