//! # Node API Service
//!
//! `SecomNode` resolves callers to node records, delegates to the subsystem
//! services and converts every failure into a [`SecomError`].

use crate::domain::{
    capabilities, CapabilityDescriptor, CatalogueError, Dataset, DatasetEnvelope, DatasetFilter,
    DatasetQuery, DatasetSummary, IngestRequest,
};
use crate::ports::{DatasetCatalogue, PendingPublication, SecomApi};
use async_trait::async_trait;
use bytes::Bytes;
use shared_bus::{EventPublisher, NodeEvent};
use shared_types::{
    AckType, AcknowledgementObject, DataReference, DigitalSignatureValue, ExchangeMetadata, Mrn,
    NackType, ProductType, SecomError, SubscriptionId, TimeSource, Timestamp, TransactionId,
};
use std::sync::Arc;
use tracing::{debug, warn};
use tw_01_identity_resolver::IdentityApi;
use tw_02_geospatial_filter::GeospatialFilter;
use tw_03_link_store::LinkStoreApi;
use tw_04_trust_provider::EnvelopeSigner;
use tw_06_subscription_manager::{PublishedDataset, SubscriptionApi, SubscriptionRequest};
use tw_07_delivery_engine::{AckOutcome, DeliveryApi, Publication, PublishReport};
use tw_telemetry::{
    log_event, log_tx_event, HistogramTimer, ACKNOWLEDGEMENTS, DATASETS_INGESTED, LINKS_STORED,
    PUBLISH_DURATION, SUBSYSTEM_ERRORS, UPLOADS_FAILED, UPLOADS_SENT,
};

const SUBSYSTEM: &str = "tw-08";

/// Collaborators of the node facade.
pub struct NodeApiDependencies {
    pub identity: Arc<dyn IdentityApi>,
    pub subscriptions: Arc<dyn SubscriptionApi>,
    pub delivery: Arc<dyn DeliveryApi>,
    pub links: Arc<dyn LinkStoreApi>,
    pub catalogue: Arc<dyn DatasetCatalogue>,
    pub geo: Arc<GeospatialFilter>,
    pub signer: Arc<dyn EnvelopeSigner>,
    pub events: Arc<dyn EventPublisher>,
    pub time_source: Arc<dyn TimeSource>,
}

pub struct SecomNode {
    identity: Arc<dyn IdentityApi>,
    subscriptions: Arc<dyn SubscriptionApi>,
    delivery: Arc<dyn DeliveryApi>,
    links: Arc<dyn LinkStoreApi>,
    catalogue: Arc<dyn DatasetCatalogue>,
    geo: Arc<GeospatialFilter>,
    signer: Arc<dyn EnvelopeSigner>,
    events: Arc<dyn EventPublisher>,
    time_source: Arc<dyn TimeSource>,
    capabilities: Vec<CapabilityDescriptor>,
}

impl SecomNode {
    pub fn new(deps: NodeApiDependencies) -> Self {
        Self {
            identity: deps.identity,
            subscriptions: deps.subscriptions,
            delivery: deps.delivery,
            links: deps.links,
            catalogue: deps.catalogue,
            geo: deps.geo,
            signer: deps.signer,
            events: deps.events,
            time_source: deps.time_source,
            capabilities: capabilities(),
        }
    }

    /// Reject product types and versions this node does not serve.
    fn check_product(
        product_type: ProductType,
        version: Option<&str>,
    ) -> Result<(), CatalogueError> {
        let mut offered = product_type.supported_products().peekable();
        if offered.peek().is_none() {
            return Err(CatalogueError::UnsupportedProduct(product_type.to_string()));
        }
        if let Some(version) = version {
            if !offered.any(|p| p.product_version == version) {
                return Err(CatalogueError::UnsupportedProduct(format!(
                    "{product_type} version {version}"
                )));
            }
        }
        Ok(())
    }

    fn check_window(
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> Result<(), CatalogueError> {
        match (from, to) {
            (Some(from), Some(to)) if to < from => Err(CatalogueError::InvalidValidity),
            _ => Ok(()),
        }
    }

    /// Validate a filter and expand it into one query per product type.
    fn queries(&self, filter: DatasetFilter) -> Result<Vec<DatasetQuery>, CatalogueError> {
        let product_types: Vec<ProductType> = match filter.data_product_type {
            Some(product_type) => {
                Self::check_product(product_type, filter.product_version.as_deref())?;
                vec![product_type]
            }
            None => {
                let mut all: Vec<ProductType> = shared_types::SUPPORTED_PRODUCTS
                    .iter()
                    .map(|p| p.product_type)
                    .collect();
                all.dedup();
                all
            }
        };
        Self::check_window(filter.valid_from, filter.valid_to)?;
        let geometry = self
            .geo
            .parse_geometry(filter.geometry.as_deref(), filter.unlocode.as_deref())?;

        Ok(product_types
            .into_iter()
            .map(|product_type| DatasetQuery {
                data_reference: filter.data_reference,
                product_type,
                product_version: filter.product_version.clone(),
                geometry: geometry.clone(),
                valid_from: filter.valid_from,
                valid_to: filter.valid_to,
            })
            .collect())
    }

    async fn find(&self, filter: DatasetFilter) -> Result<Vec<Dataset>, CatalogueError> {
        let mut found = Vec::new();
        for query in self.queries(filter)? {
            found.extend(self.catalogue.find(&query).await?);
        }
        Ok(found)
    }

    fn envelope(&self, dataset: Dataset) -> Result<DatasetEnvelope, CatalogueError> {
        let signature = self.signer.sign(&dataset.payload)?;
        Ok(DatasetEnvelope {
            data_reference: dataset.data_reference,
            exchange_metadata: ExchangeMetadata {
                data_protection: false,
                compression_flag: false,
                digital_signature_reference: self.signer.algorithm().as_str().to_string(),
                digital_signature_value: DigitalSignatureValue {
                    public_root_certificate_thumbprint: self.signer.trust_anchor_thumbprint(),
                    public_certificate: self.signer.signing_certificate_pem(),
                    digital_signature: hex::encode(signature),
                },
            },
            data: dataset.payload,
        })
    }

    async fn ingest_dataset(&self, request: IngestRequest) -> Result<Dataset, CatalogueError> {
        Self::check_product(request.data_product_type, Some(request.product_version.as_str()))?;
        Self::check_window(request.valid_from, request.valid_to)?;
        let mrn = Mrn::parse(&request.mrn)?;
        let geometry = self.geo.parse_geometry(request.geometry.as_deref(), None)?;
        let data_reference = DataReference::for_name(mrn.as_str());

        let mut targets = Vec::with_capacity(request.references.len());
        for raw in &request.references {
            let target = DataReference::for_name(Mrn::parse(raw)?.as_str());
            if target == data_reference {
                return Err(CatalogueError::SelfReference(data_reference));
            }
            targets.push((raw, target));
        }

        let dataset = Dataset {
            data_reference,
            mrn,
            product_type: request.data_product_type,
            product_version: request.product_version,
            title: request.title,
            geometry,
            valid_from: request.valid_from,
            valid_to: request.valid_to,
            payload: request.payload,
            created_at: self.time_source.now(),
        };
        self.catalogue.upsert(dataset.clone()).await?;
        // A re-ingest replaces the dataset, edges included.
        self.catalogue.clear_references(data_reference).await?;

        for (raw, target) in targets {
            // Only link datasets we know; a reference may arrive before its target.
            if self.catalogue.get(target).await?.is_some() {
                self.catalogue.add_reference(data_reference, target).await?;
            } else {
                debug!(data_reference = %data_reference, reference = %raw, "Skipping unknown reference");
            }
        }

        Ok(dataset)
    }

    async fn link_datasets(
        &self,
        from: DataReference,
        to: DataReference,
    ) -> Result<(), CatalogueError> {
        if from == to {
            return Err(CatalogueError::SelfReference(from));
        }
        for id in [from, to] {
            if self.catalogue.get(id).await?.is_none() {
                return Err(CatalogueError::DatasetNotFound(id));
            }
        }
        self.catalogue.add_reference(from, to).await?;
        Ok(())
    }

    /// Announce and count a first acknowledgement; repeats are only logged.
    async fn apply_ack(
        &self,
        mrn: &Mrn,
        ack_type: AckType,
        outcome: Result<AckOutcome, SecomError>,
    ) -> Result<(), SecomError> {
        match outcome? {
            AckOutcome::Applied(tx) => {
                ACKNOWLEDGEMENTS
                    .with_label_values(&[ack_type.as_str()])
                    .inc();
                self.events
                    .publish(NodeEvent::TransactionAcknowledged {
                        transaction_id: tx.id,
                        node: mrn.clone(),
                        ack_type,
                    })
                    .await;
            }
            AckOutcome::AlreadyApplied(tx) => {
                log_tx_event!(debug, SUBSYSTEM, "Repeated acknowledgement ignored", tx.id, mrn = %mrn);
            }
        }
        Ok(())
    }
}

/// Count and log a failed operation before handing it back.
fn observe<T>(operation: &'static str, result: Result<T, SecomError>) -> Result<T, SecomError> {
    if let Err(e) = &result {
        let kind = e.kind().to_string();
        SUBSYSTEM_ERRORS
            .with_label_values(&[SUBSYSTEM, kind.as_str()])
            .inc();
        debug!(operation, error = %e, "Operation failed");
    }
    result
}

#[async_trait]
impl SecomApi for SecomNode {
    async fn ping(&self, mrn: &Mrn) -> Result<Option<Timestamp>, SecomError> {
        let result = self.identity.record_interaction(mrn).await;
        observe("ping", result.map_err(SecomError::from))
    }

    fn capability(&self) -> Vec<CapabilityDescriptor> {
        self.capabilities.clone()
    }

    async fn subscribe(
        &self,
        mrn: &Mrn,
        request: SubscriptionRequest,
    ) -> Result<SubscriptionId, SecomError> {
        let result = async {
            let node = self.identity.find_or_create(mrn).await?;
            Ok::<_, SecomError>(self.subscriptions.subscribe(&node, request).await?)
        }
        .await;
        observe("subscribe", result)
    }

    async fn unsubscribe(&self, mrn: &Mrn, id: SubscriptionId) -> Result<(), SecomError> {
        let result = async {
            let Some(node) = self.identity.find(mrn).await? else {
                return Err(SecomError::NotFound(format!(
                    "Unknown subscription with UUID {id}"
                )));
            };
            Ok::<_, SecomError>(self.subscriptions.unsubscribe(&node, id).await?)
        }
        .await;
        observe("unsubscribe", result)
    }

    async fn acknowledge(
        &self,
        mrn: &Mrn,
        id: TransactionId,
        ack_type: AckType,
        nack_type: Option<NackType>,
    ) -> Result<(), SecomError> {
        let result = async {
            let node = self.identity.find_or_create(mrn).await?;
            self.identity.record_interaction(mrn).await?;
            let outcome = self
                .delivery
                .acknowledge(&node, id, ack_type, nack_type)
                .await
                .map_err(SecomError::from);
            self.apply_ack(mrn, ack_type, outcome).await
        }
        .await;
        observe("acknowledge", result)
    }

    async fn acknowledge_envelope(
        &self,
        mrn: &Mrn,
        ack: &AcknowledgementObject,
    ) -> Result<(), SecomError> {
        let result = async {
            let node = self.identity.find_or_create(mrn).await?;
            self.identity.record_interaction(mrn).await?;
            let outcome = self
                .delivery
                .acknowledge_envelope(&node, ack)
                .await
                .map_err(SecomError::from);
            self.apply_ack(mrn, ack.envelope.ack_type, outcome).await
        }
        .await;
        observe("acknowledge", result)
    }

    async fn get(&self, filter: DatasetFilter) -> Result<Vec<DatasetEnvelope>, SecomError> {
        let result = async {
            self.find(filter)
                .await?
                .into_iter()
                .map(|dataset| self.envelope(dataset))
                .collect::<Result<Vec<_>, _>>()
        }
        .await;
        observe("get", result.map_err(SecomError::from))
    }

    async fn get_summary(&self, filter: DatasetFilter) -> Result<Vec<DatasetSummary>, SecomError> {
        let result = self
            .find(filter)
            .await
            .map(|found| found.iter().map(Dataset::summary).collect());
        observe("get_summary", result.map_err(SecomError::from))
    }

    async fn get_by_link(&self, mrn: &Mrn, id: TransactionId) -> Result<Bytes, SecomError> {
        let result = async {
            let node = self.identity.find_or_create(mrn).await?;
            Ok::<_, SecomError>(self.links.get_link(node.id, id).await?)
        }
        .await;
        observe("get_by_link", result)
    }

    async fn ingest(&self, request: IngestRequest) -> Result<DataReference, SecomError> {
        let dataset = match self.ingest_dataset(request).await {
            Ok(dataset) => dataset,
            Err(e) => {
                warn!(error = %e, "Dataset rejected");
                return observe("ingest", Err(e.into()));
            }
        };

        DATASETS_INGESTED.inc();
        log_event!(
            info,
            SUBSYSTEM,
            "Dataset ingested",
            data_reference = %dataset.data_reference,
            mrn = %dataset.mrn,
            size = dataset.payload.len()
        );
        self.events
            .publish(NodeEvent::DatasetIngested {
                data_reference: dataset.data_reference,
                product_type: dataset.product_type,
                product_version: dataset.product_version,
            })
            .await;
        Ok(dataset.data_reference)
    }

    async fn publish(&self, data_reference: DataReference) -> Result<PublishReport, SecomError> {
        let result = async {
            let dataset = self
                .catalogue
                .get(data_reference)
                .await
                .map_err(CatalogueError::from)?
                .ok_or(CatalogueError::DatasetNotFound(data_reference))?;

            let publication = Publication {
                dataset: PublishedDataset {
                    product_type: dataset.product_type,
                    product_version: dataset.product_version,
                    data_reference: Some(dataset.data_reference),
                    geometry: dataset.geometry,
                },
                payload: dataset.payload,
            };

            let _timer = HistogramTimer::new(&PUBLISH_DURATION);
            let report = self.delivery.publish(publication).await?;

            UPLOADS_SENT.inc_by(report.delivered.len() as f64);
            UPLOADS_FAILED.inc_by(report.failed.len() as f64);
            LINKS_STORED.inc_by(report.delivered.iter().filter(|d| d.as_link).count() as f64);
            Ok::<_, SecomError>(report)
        }
        .await;
        observe("publish", result)
    }

    async fn publish_pending(&self) -> Result<Vec<PendingPublication>, SecomError> {
        let pending = match self.catalogue.take_pending().await {
            Ok(pending) => pending,
            Err(e) => return observe("publish_pending", Err(CatalogueError::from(e).into())),
        };

        let mut outcomes = Vec::with_capacity(pending.len());
        for data_reference in pending {
            let result = self.publish(data_reference).await;
            outcomes.push((data_reference, result));
        }
        Ok(outcomes)
    }

    async fn add_reference(
        &self,
        from: DataReference,
        to: DataReference,
    ) -> Result<(), SecomError> {
        let result = self.link_datasets(from, to).await;
        observe("add_reference", result.map_err(SecomError::from))
    }

    async fn references(&self, id: DataReference) -> Result<Vec<DataReference>, SecomError> {
        let result = async {
            if self.catalogue.get(id).await?.is_none() {
                return Err(CatalogueError::DatasetNotFound(id));
            }
            Ok(self.catalogue.references(id).await?)
        }
        .await;
        observe("references", result.map_err(SecomError::from))
    }
}
