//! # Inbound Ports (Driving Ports)

use crate::domain::{AckOutcome, DeliveryError, Publication, PublishReport};
use async_trait::async_trait;
use shared_types::{
    AckType, AcknowledgementObject, NackType, SubscriptionEvent, SubscriptionId, TransactionId,
};
use tw_01_identity_resolver::Node;

/// Primary API of the delivery engine.
#[async_trait]
pub trait DeliveryApi: Send + Sync {
    /// Apply an acknowledgement from `node` to one of its transactions.
    async fn acknowledge(
        &self,
        node: &Node,
        id: TransactionId,
        ack_type: AckType,
        nack_type: Option<NackType>,
    ) -> Result<AckOutcome, DeliveryError>;

    /// Check the envelope signature, then [`DeliveryApi::acknowledge`].
    async fn acknowledge_envelope(
        &self,
        node: &Node,
        ack: &AcknowledgementObject,
    ) -> Result<AckOutcome, DeliveryError>;

    /// Push a dataset to every matching subscriber. Per-subscriber failures
    /// are reported, not returned.
    async fn publish(&self, publication: Publication) -> Result<PublishReport, DeliveryError>;

    /// Tell `node` that its subscription was created or removed.
    async fn send_notification(
        &self,
        node: &Node,
        subscription: SubscriptionId,
        event: SubscriptionEvent,
    ) -> Result<(), DeliveryError>;
}
