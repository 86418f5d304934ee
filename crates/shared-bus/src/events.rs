//! # Node Events
//!
//! Facts announced by subsystems. Events carry identifiers only; handlers
//! reload whatever they need from the owning subsystem.

use serde::{Deserialize, Serialize};
use shared_types::entities::{AckType, DataReference, Mrn, ProductType, SubscriptionId, TransactionId};

/// Events flowing over the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeEvent {
    /// A dataset was stored in the local catalogue and should be pushed to
    /// matching subscribers.
    DatasetIngested {
        data_reference: DataReference,
        product_type: ProductType,
        product_version: String,
    },

    /// A remote node subscribed.
    SubscriptionCreated {
        subscription_id: SubscriptionId,
        node: Mrn,
    },

    /// A remote node unsubscribed.
    SubscriptionRemoved {
        subscription_id: SubscriptionId,
        node: Mrn,
    },

    /// A remote node acknowledged one of our transactions.
    TransactionAcknowledged {
        transaction_id: TransactionId,
        node: Mrn,
        ack_type: AckType,
    },
}

impl NodeEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::DatasetIngested { .. } => EventTopic::Datasets,
            Self::SubscriptionCreated { .. } | Self::SubscriptionRemoved { .. } => {
                EventTopic::Subscriptions
            }
            Self::TransactionAcknowledged { .. } => EventTopic::Delivery,
        }
    }

    /// Get the originating subsystem number.
    #[must_use]
    pub fn source_subsystem(&self) -> u8 {
        match self {
            Self::DatasetIngested { .. } => 8,
            Self::SubscriptionCreated { .. } | Self::SubscriptionRemoved { .. } => 6,
            Self::TransactionAcknowledged { .. } => 7,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Catalogue changes.
    Datasets,
    /// Subscription lifecycle.
    Subscriptions,
    /// Transaction acknowledgements.
    Delivery,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Source subsystems to include. Empty means all sources.
    pub source_subsystems: Vec<u8>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            source_subsystems: Vec::new(),
        }
    }

    /// Create a filter for events from specific subsystems.
    #[must_use]
    pub fn from_subsystems(subsystems: Vec<u8>) -> Self {
        Self {
            topics: Vec::new(),
            source_subsystems: subsystems,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &NodeEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let source_match = self.source_subsystems.is_empty()
            || self.source_subsystems.contains(&event.source_subsystem());

        topic_match && source_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingested() -> NodeEvent {
        NodeEvent::DatasetIngested {
            data_reference: DataReference::for_name("nw-2024-117"),
            product_type: ProductType::S124,
            product_version: "2.0.0".into(),
        }
    }

    fn removed() -> NodeEvent {
        NodeEvent::SubscriptionRemoved {
            subscription_id: SubscriptionId::new_random(),
            node: Mrn::parse("urn:mrn:mcp:device:dk:peer").unwrap(),
        }
    }

    #[test]
    fn test_event_topic_mapping() {
        assert_eq!(ingested().topic(), EventTopic::Datasets);
        assert_eq!(ingested().source_subsystem(), 8);
        assert_eq!(removed().topic(), EventTopic::Subscriptions);
        assert_eq!(removed().source_subsystem(), 6);
    }

    #[test]
    fn test_acknowledgement_is_a_delivery_event() {
        let event = NodeEvent::TransactionAcknowledged {
            transaction_id: TransactionId::new_random(),
            node: Mrn::parse("urn:mrn:mcp:device:dk:peer").unwrap(),
            ack_type: AckType::DeliveredAck,
        };
        assert_eq!(event.topic(), EventTopic::Delivery);
        assert_eq!(event.source_subsystem(), 7);
    }

    #[test]
    fn test_filter_all() {
        let filter = EventFilter::all();
        assert!(filter.matches(&ingested()));
        assert!(filter.matches(&removed()));
        assert!(EventFilter::topics(vec![EventTopic::All]).matches(&removed()));
    }

    #[test]
    fn test_filter_by_topic() {
        let filter = EventFilter::topics(vec![EventTopic::Datasets]);
        assert!(filter.matches(&ingested()));
        assert!(!filter.matches(&removed()));
    }

    #[test]
    fn test_filter_by_subsystem() {
        let filter = EventFilter::from_subsystems(vec![6, 7]);
        assert!(!filter.matches(&ingested()));
        assert!(filter.matches(&removed()));
    }

    #[test]
    fn test_event_serializes_with_variant_tag() {
        let json = serde_json::to_value(ingested()).unwrap();
        assert_eq!(json["DatasetIngested"]["product_type"], "S124");
    }
}
