//! # Inbound Ports (Driving Ports)

use crate::domain::{
    CapabilityDescriptor, DatasetEnvelope, DatasetFilter, DatasetSummary, IngestRequest,
};
use async_trait::async_trait;
use bytes::Bytes;
use shared_types::{
    AckType, AcknowledgementObject, DataReference, Mrn, NackType, SecomError, SubscriptionId,
    Timestamp, TransactionId,
};
use tw_06_subscription_manager::SubscriptionRequest;
use tw_07_delivery_engine::PublishReport;

/// Outcome of publishing one pending dataset.
pub type PendingPublication = (DataReference, Result<PublishReport, SecomError>);

/// SECOM operations of a node.
///
/// `mrn` is the caller's identity as authenticated by the transport layer.
#[async_trait]
pub trait SecomApi: Send + Sync {
    /// Record an interaction and return the previous one.
    async fn ping(&self, mrn: &Mrn) -> Result<Option<Timestamp>, SecomError>;

    /// What this node serves. Static for the process lifetime.
    fn capability(&self) -> Vec<CapabilityDescriptor>;

    async fn subscribe(
        &self,
        mrn: &Mrn,
        request: SubscriptionRequest,
    ) -> Result<SubscriptionId, SecomError>;

    async fn unsubscribe(&self, mrn: &Mrn, id: SubscriptionId) -> Result<(), SecomError>;

    async fn acknowledge(
        &self,
        mrn: &Mrn,
        id: TransactionId,
        ack_type: AckType,
        nack_type: Option<NackType>,
    ) -> Result<(), SecomError>;

    /// Verify a signed acknowledgement envelope, then apply it.
    async fn acknowledge_envelope(
        &self,
        mrn: &Mrn,
        ack: &AcknowledgementObject,
    ) -> Result<(), SecomError>;

    /// Signed datasets matching `filter`.
    async fn get(&self, filter: DatasetFilter) -> Result<Vec<DatasetEnvelope>, SecomError>;

    async fn get_summary(&self, filter: DatasetFilter) -> Result<Vec<DatasetSummary>, SecomError>;

    /// Payload behind a link previously sent to `mrn`.
    async fn get_by_link(&self, mrn: &Mrn, id: TransactionId) -> Result<Bytes, SecomError>;

    /// Store a dataset and announce it on the event bus.
    async fn ingest(&self, request: IngestRequest) -> Result<DataReference, SecomError>;

    /// Push a catalogued dataset to its subscribers.
    async fn publish(&self, data_reference: DataReference) -> Result<PublishReport, SecomError>;

    /// Publish every dataset ingested since the last call, oldest first.
    ///
    /// One failed dataset does not stop the others. The outer error is
    /// reserved for the catalogue itself failing.
    async fn publish_pending(&self) -> Result<Vec<PendingPublication>, SecomError>;

    /// Record that `from` refers to `to`. Self-references are rejected.
    async fn add_reference(&self, from: DataReference, to: DataReference)
        -> Result<(), SecomError>;

    async fn references(&self, id: DataReference) -> Result<Vec<DataReference>, SecomError>;
}
