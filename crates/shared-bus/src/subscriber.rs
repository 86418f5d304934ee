//! # Event Subscriber
//!
//! Defines the subscription side of the event bus.

use crate::events::{EventFilter, NodeEvent};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The event bus was closed.
    #[error("Event bus closed")]
    Closed,
}

/// What [`Subscription::recv_with_lag`] hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    Event(NodeEvent),
    /// The subscriber fell behind and this many events were overwritten
    /// before it read them.
    Lagged(u64),
}

/// Trait for subscribing to events from the bus.
pub trait EventSubscriber: Send + Sync {
    /// Subscribe to events matching a filter.
    fn subscribe(&self, filter: EventFilter) -> Subscription;
}

/// A subscription handle for receiving events.
///
/// Dropping the handle unsubscribes.
pub struct Subscription {
    receiver: broadcast::Receiver<NodeEvent>,
    filter: EventFilter,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<NodeEvent>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next event that matches the filter.
    ///
    /// Returns `None` once the bus is dropped. Lag is logged and skipped; use
    /// [`recv_with_lag`](Self::recv_with_lag) when missed events matter.
    pub async fn recv(&mut self) -> Option<NodeEvent> {
        loop {
            match self.recv_with_lag().await? {
                Received::Event(event) => return Some(event),
                Received::Lagged(count) => {
                    warn!(lagged = count, "Subscriber lagged, some events dropped");
                }
            }
        }
    }

    /// Receive the next matching event, or report that events were missed.
    ///
    /// The lag count covers every overwritten event, filtered or not.
    pub async fn recv_with_lag(&mut self) -> Option<Received> {
        loop {
            let event = match self.receiver.recv().await {
                Ok(e) => e,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    return Some(Received::Lagged(count));
                }
            };

            if self.filter.matches(&event) {
                return Some(Received::Event(event));
            }
        }
    }

    /// Try to receive the next event without blocking.
    ///
    /// `Ok(None)` means nothing matching is queued right now.
    pub fn try_recv(&mut self) -> Result<Option<NodeEvent>, SubscriptionError> {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(e) => e,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, some events dropped");
                    continue;
                }
            };

            if self.filter.matches(&event) {
                return Ok(Some(event));
            }
        }
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}
