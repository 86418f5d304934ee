//! # Ingest Handler
//!
//! Listens for `DatasetIngested` events and pushes every dataset ingested
//! since the last pass to the matching subscribers through the node API.
//!
//! ```text
//! tw-08 ingest ──DatasetIngested──→ Event Bus ──→ IngestHandler ──→ SecomApi::publish_pending
//! ```
//!
//! The event is only a wake-up; the catalogue keeps the pending list. When
//! the bus overwrites events before the handler reads them, the handler
//! counts the loss and still drains everything pending.

use shared_bus::{EventFilter, EventSubscriber, EventTopic, NodeEvent, Received, Subscription};
use std::sync::Arc;
use tracing::{info, instrument};
use tw_08_node_api::SecomApi;
use tw_telemetry::{log_event, BUS_EVENTS_LAGGED};

const SUBSYSTEM: &str = "node-runtime";

pub struct IngestHandler {
    api: Arc<dyn SecomApi>,
    subscription: Subscription,
}

impl IngestHandler {
    /// Subscribe to the datasets topic on `bus`.
    pub fn new(api: Arc<dyn SecomApi>, bus: &dyn EventSubscriber) -> Self {
        let subscription = bus.subscribe(EventFilter::topics(vec![EventTopic::Datasets]));
        Self { api, subscription }
    }

    /// Process events until the bus closes.
    #[instrument(skip(self), name = "ingest_handler")]
    pub async fn run(mut self) {
        info!("Ingest handler started");

        while let Some(received) = self.subscription.recv_with_lag().await {
            match received {
                Received::Event(NodeEvent::DatasetIngested { .. }) => self.publish_pending().await,
                Received::Event(_) => {}
                Received::Lagged(missed) => {
                    BUS_EVENTS_LAGGED.inc_by(missed as f64);
                    log_event!(
                        warn,
                        SUBSYSTEM,
                        "Ingest handler lagged, catching up from the catalogue",
                        missed = missed
                    );
                    self.publish_pending().await;
                }
            }
        }

        info!("Event bus closed, ingest handler stopping");
    }

    async fn publish_pending(&self) {
        let outcomes = match self.api.publish_pending().await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                log_event!(warn, SUBSYSTEM, "Pending datasets unavailable", error = %e);
                return;
            }
        };

        for (data_reference, result) in outcomes {
            match result {
                Ok(report) => log_event!(
                    info,
                    SUBSYSTEM,
                    "Dataset published",
                    data_reference = %data_reference,
                    matched = report.matched,
                    delivered = report.delivered.len(),
                    failed = report.failed.len()
                ),
                Err(e) => log_event!(
                    warn,
                    SUBSYSTEM,
                    "Dataset publish failed",
                    data_reference = %data_reference,
                    error = %e
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use shared_bus::{EventPublisher, InMemoryEventBus};
    use shared_types::{
        AckType, AcknowledgementObject, DataReference, Mrn, NackType, ProductType, SecomError,
        SubscriptionId, Timestamp, TransactionId,
    };
    use tw_06_subscription_manager::SubscriptionRequest;
    use tw_07_delivery_engine::PublishReport;
    use std::sync::Mutex;
    use tw_08_node_api::{
        CapabilityDescriptor, DatasetEnvelope, DatasetFilter, DatasetSummary, IngestRequest,
        PendingPublication,
    };

    /// Keeps a pending list like the catalogue and forwards published
    /// references to the test body.
    struct Recorder {
        pending: Mutex<Vec<DataReference>>,
        tx: tokio::sync::mpsc::UnboundedSender<DataReference>,
    }

    impl Recorder {
        fn new(tx: tokio::sync::mpsc::UnboundedSender<DataReference>) -> Self {
            Self {
                pending: Mutex::new(Vec::new()),
                tx,
            }
        }

        fn stage(&self, data_reference: DataReference) {
            self.pending.lock().unwrap().push(data_reference);
        }
    }

    #[async_trait]
    impl SecomApi for Recorder {
        async fn ping(&self, _mrn: &Mrn) -> Result<Option<Timestamp>, SecomError> {
            Ok(None)
        }

        fn capability(&self) -> Vec<CapabilityDescriptor> {
            Vec::new()
        }

        async fn subscribe(
            &self,
            _mrn: &Mrn,
            _request: SubscriptionRequest,
        ) -> Result<SubscriptionId, SecomError> {
            Ok(SubscriptionId::new_random())
        }

        async fn unsubscribe(&self, _mrn: &Mrn, _id: SubscriptionId) -> Result<(), SecomError> {
            Ok(())
        }

        async fn acknowledge(
            &self,
            _mrn: &Mrn,
            _id: TransactionId,
            _ack_type: AckType,
            _nack_type: Option<NackType>,
        ) -> Result<(), SecomError> {
            Ok(())
        }

        async fn acknowledge_envelope(
            &self,
            _mrn: &Mrn,
            _ack: &AcknowledgementObject,
        ) -> Result<(), SecomError> {
            Ok(())
        }

        async fn get(&self, _filter: DatasetFilter) -> Result<Vec<DatasetEnvelope>, SecomError> {
            Ok(Vec::new())
        }

        async fn get_summary(
            &self,
            _filter: DatasetFilter,
        ) -> Result<Vec<DatasetSummary>, SecomError> {
            Ok(Vec::new())
        }

        async fn get_by_link(&self, _mrn: &Mrn, id: TransactionId) -> Result<Bytes, SecomError> {
            Err(SecomError::NotFound(format!("{id}")))
        }

        async fn ingest(&self, _request: IngestRequest) -> Result<DataReference, SecomError> {
            Ok(DataReference::new_random())
        }

        async fn publish(&self, data_reference: DataReference) -> Result<PublishReport, SecomError> {
            let _ = self.tx.send(data_reference);
            Ok(PublishReport::default())
        }

        async fn publish_pending(&self) -> Result<Vec<PendingPublication>, SecomError> {
            let pending = std::mem::take(&mut *self.pending.lock().unwrap());
            let mut outcomes = Vec::new();
            for data_reference in pending {
                outcomes.push((data_reference, self.publish(data_reference).await));
            }
            Ok(outcomes)
        }

        async fn add_reference(
            &self,
            _from: DataReference,
            _to: DataReference,
        ) -> Result<(), SecomError> {
            Ok(())
        }

        async fn references(&self, _id: DataReference) -> Result<Vec<DataReference>, SecomError> {
            Ok(Vec::new())
        }
    }

    fn ingested(data_reference: DataReference) -> NodeEvent {
        NodeEvent::DatasetIngested {
            data_reference,
            product_type: ProductType::S124,
            product_version: "2.0.0".into(),
        }
    }

    #[tokio::test]
    async fn test_ingested_dataset_is_published_and_other_events_ignored() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let recorder = Arc::new(Recorder::new(tx));
        let bus = Arc::new(InMemoryEventBus::new());
        let handler = IngestHandler::new(recorder.clone(), bus.as_ref());
        let task = tokio::spawn(handler.run());

        let reference = DataReference::new_random();
        bus.publish(NodeEvent::SubscriptionCreated {
            subscription_id: SubscriptionId::new_random(),
            node: Mrn::parse("urn:mrn:mcp:device:ship").unwrap(),
        })
        .await;
        recorder.stage(reference);
        bus.publish(ingested(reference)).await;

        assert_eq!(rx.recv().await, Some(reference));

        drop(bus);
        task.await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_lagged_handler_still_publishes_every_dataset_once() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let recorder = Arc::new(Recorder::new(tx));
        let bus = Arc::new(InMemoryEventBus::with_capacity(1));
        let handler = IngestHandler::new(recorder.clone(), bus.as_ref());
        let lagged_before = BUS_EVENTS_LAGGED.get();

        let references: Vec<_> = (0..3).map(|_| DataReference::new_random()).collect();
        for reference in &references {
            recorder.stage(*reference);
            bus.publish(ingested(*reference)).await;
        }

        let task = tokio::spawn(handler.run());
        for reference in &references {
            assert_eq!(rx.recv().await, Some(*reference));
        }

        drop(bus);
        task.await.unwrap();
        assert!(rx.try_recv().is_err());
        assert!(BUS_EVENTS_LAGGED.get() - lagged_before >= 2.0);
    }
}
