//! # Delivery Engine Service

use crate::domain::{
    AckOutcome, Delivery, DeliveryConfig, DeliveryError, DeliveryFailure, Publication,
    PublishReport, Transaction, TransactionPayload,
};
use crate::ports::{DeliveryApi, TransactionRepository};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use shared_types::{
    AckRequest, AckType, AcknowledgementObject, EnvelopeCredentials, EnvelopeLinkObject,
    EnvelopeSubscriptionNotificationObject, EnvelopeUploadObject, Mrn, NackType, ResponseObject,
    SecomError, StoreError, SubscriptionEvent, SubscriptionId, TimeSource, Timestamp,
    TransactionId,
};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tw_01_identity_resolver::Node;
use tw_03_link_store::LinkStoreApi;
use tw_04_trust_provider::{sign_envelope, verify_envelope, EnvelopeSigner};
use tw_05_service_locator::{EndpointResolver, LocatorError, RemoteNodeClient};
use tw_06_subscription_manager::{SubscriberLookup, Subscription, SubscriptionNotifier};

type DeliveryOutcome = Result<Delivery, (Option<TransactionId>, DeliveryError)>;

pub struct DeliveryEngine {
    subscribers: Arc<dyn SubscriberLookup>,
    transactions: Arc<dyn TransactionRepository>,
    links: Arc<dyn LinkStoreApi>,
    signer: Arc<dyn EnvelopeSigner>,
    resolver: Arc<dyn EndpointResolver>,
    time_source: Arc<dyn TimeSource>,
    config: DeliveryConfig,
}

/// Collaborators of the engine.
pub struct DeliveryDependencies {
    pub subscribers: Arc<dyn SubscriberLookup>,
    pub transactions: Arc<dyn TransactionRepository>,
    pub links: Arc<dyn LinkStoreApi>,
    pub signer: Arc<dyn EnvelopeSigner>,
    pub resolver: Arc<dyn EndpointResolver>,
    pub time_source: Arc<dyn TimeSource>,
}

impl DeliveryEngine {
    pub fn new(deps: DeliveryDependencies, config: DeliveryConfig) -> Self {
        Self {
            subscribers: deps.subscribers,
            transactions: deps.transactions,
            links: deps.links,
            signer: deps.signer,
            resolver: deps.resolver,
            time_source: deps.time_source,
            config,
        }
    }

    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    /// Resolve `mrn` and run `call` against its client, all within the send
    /// timeout.
    async fn send<F, Fut>(&self, mrn: &Mrn, call: F) -> Result<ResponseObject, DeliveryError>
    where
        F: FnOnce(Arc<dyn RemoteNodeClient>) -> Fut + Send,
        Fut: Future<Output = Result<ResponseObject, LocatorError>> + Send,
    {
        let attempt = async {
            let client = self.resolver.resolve_mrn(mrn).await?;
            call(client).await.map_err(DeliveryError::from)
        };
        tokio::time::timeout(self.config.send_timeout, attempt)
            .await
            .map_err(|_| DeliveryError::Timeout {
                recipient: mrn.to_string(),
            })?
    }

    /// Record a transaction for one subscriber, then sign and send the
    /// dataset to it.
    async fn deliver(
        &self,
        subscription: &Subscription,
        publication: &Publication,
    ) -> DeliveryOutcome {
        let now = self.time_source.now();
        let size = publication.payload.len();

        let (id, payload) = if size > self.config.inline_limit {
            let expires_at = now + self.config.link_ttl;
            let id = self
                .links
                .store_link(subscription.node, expires_at, publication.payload.clone())
                .await
                .map_err(|e| (None::<TransactionId>, DeliveryError::from(e)))?;
            (id, TransactionPayload::Link { expires_at })
        } else {
            (
                TransactionId::new_random(),
                TransactionPayload::Inline { size: size as u64 },
            )
        };

        let transaction = Transaction::open(
            id,
            subscription.node,
            subscription.node_mrn.clone(),
            payload,
            now,
        );
        self.transactions
            .insert(transaction)
            .await
            .map_err(|e| (None::<TransactionId>, DeliveryError::from(e)))?;

        let sent = self
            .send_dataset(subscription, publication, id, payload, now)
            .await;
        self.record_dispatch(id, sent.as_ref().err().map(ToString::to_string))
            .await;

        match sent {
            Ok(response) => {
                debug!(
                    transaction_id = %id,
                    recipient = %subscription.node_mrn,
                    response = %response.message,
                    "Dataset delivered"
                );
                Ok(Delivery {
                    subscription: subscription.id,
                    recipient: subscription.node_mrn.clone(),
                    transaction: id,
                    as_link: matches!(payload, TransactionPayload::Link { .. }),
                })
            }
            Err(e) => Err((Some(id), e)),
        }
    }

    async fn send_dataset(
        &self,
        subscription: &Subscription,
        publication: &Publication,
        id: TransactionId,
        payload: TransactionPayload,
        now: Timestamp,
    ) -> Result<ResponseObject, DeliveryError> {
        let product_type = publication.dataset.product_type;
        match payload {
            TransactionPayload::Link { expires_at } => {
                let envelope = EnvelopeLinkObject {
                    container_type: subscription.container_type,
                    data_product_type: product_type,
                    from_subscription: true,
                    ack_request: AckRequest::DeliveredAckRequested,
                    transaction_identifier: id,
                    size: publication.payload.len() as u64,
                    time_to_live: expires_at,
                    credentials: EnvelopeCredentials::default(),
                };
                let signed = sign_envelope(self.signer.as_ref(), envelope, now)?;
                self.send(&subscription.node_mrn, |client| async move {
                    client.upload_link(&signed).await
                })
                .await
            }
            TransactionPayload::Inline { .. } | TransactionPayload::None => {
                let envelope = EnvelopeUploadObject {
                    data: publication.payload.clone(),
                    container_type: subscription.container_type,
                    data_product_type: product_type,
                    from_subscription: true,
                    ack_request: AckRequest::DeliveredAckRequested,
                    transaction_identifier: id,
                    credentials: EnvelopeCredentials::default(),
                };
                let signed = sign_envelope(self.signer.as_ref(), envelope, now)?;
                self.send(&subscription.node_mrn, |client| async move {
                    client.upload(&signed).await
                })
                .await
            }
        }
    }

    /// Stamp the send outcome on the transaction. Failures here are logged;
    /// the send already happened.
    async fn record_dispatch(&self, id: TransactionId, error: Option<String>) {
        for _ in 0..self.config.ack_retries.max(1) {
            let current = match self.transactions.get(id).await {
                Ok(Some(tx)) => tx,
                Ok(None) => return,
                Err(e) => {
                    warn!(transaction_id = %id, error = %e, "Could not load transaction");
                    return;
                }
            };
            let mut next = current.clone();
            match &error {
                None => next.dispatched_at = Some(self.time_source.now()),
                Some(reason) => next.dispatch_error = Some(reason.clone()),
            }
            next.revision += 1;
            match self.transactions.update(next, current.revision).await {
                Ok(()) => return,
                Err(StoreError::Conflict(_)) => continue,
                Err(e) => {
                    warn!(transaction_id = %id, error = %e, "Could not record dispatch");
                    return;
                }
            }
        }
        warn!(transaction_id = %id, "Gave up recording dispatch after concurrent updates");
    }
}

#[async_trait]
impl DeliveryApi for DeliveryEngine {
    async fn acknowledge(
        &self,
        node: &Node,
        id: TransactionId,
        ack_type: AckType,
        nack_type: Option<NackType>,
    ) -> Result<AckOutcome, DeliveryError> {
        let now = self.time_source.now();

        for attempt in 0..self.config.ack_retries.max(1) {
            let current = self
                .transactions
                .get(id)
                .await?
                .ok_or(DeliveryError::TransactionNotFound(id))?;
            if current.owner != node.id {
                warn!(
                    transaction_id = %id,
                    owner = %current.owner_mrn,
                    requester = %node.mrn,
                    "Acknowledgement for transaction owned by another node"
                );
                return Err(DeliveryError::TransactionNotFound(id));
            }

            match current.apply_ack(ack_type, nack_type, now)? {
                AckOutcome::AlreadyApplied(tx) => {
                    debug!(transaction_id = %id, ?ack_type, "Duplicate acknowledgement ignored");
                    return Ok(AckOutcome::AlreadyApplied(tx));
                }
                AckOutcome::Applied(next) => {
                    match self.transactions.update(next.clone(), current.revision).await {
                        Ok(()) => {
                            info!(
                                transaction_id = %id,
                                mrn = %node.mrn,
                                ?ack_type,
                                ?nack_type,
                                "Acknowledgement applied"
                            );
                            return Ok(AckOutcome::Applied(next));
                        }
                        Err(StoreError::Conflict(_)) => {
                            debug!(transaction_id = %id, attempt, "Acknowledgement raced, retrying");
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            }
        }

        Err(DeliveryError::ConcurrentUpdate(id))
    }

    async fn acknowledge_envelope(
        &self,
        node: &Node,
        ack: &AcknowledgementObject,
    ) -> Result<AckOutcome, DeliveryError> {
        match verify_envelope(self.signer.as_ref(), ack) {
            Ok(true) => {}
            Ok(false) => {
                warn!(mrn = %node.mrn, "Acknowledgement signature rejected");
                return Err(DeliveryError::InvalidSignature(
                    "missing or non-verifying signature".to_string(),
                ));
            }
            Err(e) => return Err(DeliveryError::InvalidSignature(e.to_string())),
        }

        let envelope = &ack.envelope;
        self.acknowledge(
            node,
            envelope.transaction_identifier,
            envelope.ack_type,
            envelope.nack_type,
        )
        .await
    }

    async fn publish(&self, publication: Publication) -> Result<PublishReport, DeliveryError> {
        let now = self.time_source.now();
        let subscribers = self
            .subscribers
            .find_active_subscribers(&publication.dataset, now)
            .await?;

        let mut report = PublishReport {
            matched: subscribers.len(),
            ..Default::default()
        };
        if subscribers.is_empty() {
            debug!(product = %publication.dataset.product_type, "No subscribers matched");
            return Ok(report);
        }

        // Boxed up front: a closure returning an async block does not satisfy
        // the higher-ranked bounds inside an async_trait method.
        let sends: Vec<BoxFuture<'_, (&Subscription, DeliveryOutcome)>> = subscribers
            .iter()
            .map(|subscription| {
                let publication = &publication;
                async move { (subscription, self.deliver(subscription, publication).await) }
                    .boxed()
            })
            .collect();
        let results: Vec<_> = stream::iter(sends)
            .buffer_unordered(self.config.max_concurrent_sends.max(1))
            .collect()
            .await;

        for (subscription, result) in results {
            match result {
                Ok(delivery) => report.delivered.push(delivery),
                Err((transaction, error)) => {
                    warn!(
                        recipient = %subscription.node_mrn,
                        subscription_id = %subscription.id,
                        error = %error,
                        "Delivery failed"
                    );
                    report.failed.push(DeliveryFailure {
                        subscription: subscription.id,
                        recipient: subscription.node_mrn.clone(),
                        transaction,
                        error: error.to_string(),
                    });
                }
            }
        }

        info!(
            product = %publication.dataset.product_type,
            matched = report.matched,
            delivered = report.delivered.len(),
            failed = report.failed.len(),
            "Publish complete"
        );
        Ok(report)
    }

    async fn send_notification(
        &self,
        node: &Node,
        subscription: SubscriptionId,
        event: SubscriptionEvent,
    ) -> Result<(), DeliveryError> {
        let envelope = EnvelopeSubscriptionNotificationObject {
            subscription_identifier: subscription,
            event_enum: event,
            credentials: EnvelopeCredentials::default(),
        };
        let signed = sign_envelope(self.signer.as_ref(), envelope, self.time_source.now())?;
        self.send(&node.mrn, |client| async move {
            client.subscription_notification(&signed).await
        })
        .await?;
        debug!(mrn = %node.mrn, subscription_id = %subscription, event = event.as_str(), "Notification sent");
        Ok(())
    }
}

#[async_trait]
impl SubscriptionNotifier for DeliveryEngine {
    async fn notify(
        &self,
        node: &Node,
        subscription: SubscriptionId,
        event: SubscriptionEvent,
    ) -> Result<(), SecomError> {
        self.send_notification(node, subscription, event)
            .await
            .map_err(SecomError::from)
    }
}
