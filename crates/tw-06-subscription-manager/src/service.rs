//! # Subscription Manager Service

use crate::domain::{PublishedDataset, Subscription, SubscriptionError, SubscriptionRequest};
use crate::ports::{SubscriberLookup, SubscriptionApi, SubscriptionNotifier, SubscriptionRepository};
use async_trait::async_trait;
use shared_types::{SubscriptionEvent, SubscriptionId, TimeSource, Timestamp};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tw_01_identity_resolver::Node;
use tw_02_geospatial_filter::GeospatialFilter;

pub struct SubscriptionManagerService {
    repository: Arc<dyn SubscriptionRepository>,
    geo: Arc<GeospatialFilter>,
    notifier: Arc<dyn SubscriptionNotifier>,
    time_source: Arc<dyn TimeSource>,
}

impl SubscriptionManagerService {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        geo: Arc<GeospatialFilter>,
        notifier: Arc<dyn SubscriptionNotifier>,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            repository,
            geo,
            notifier,
            time_source,
        }
    }

    /// Reject products and containers this node cannot serve.
    fn check_supported(request: &SubscriptionRequest) -> Result<(), SubscriptionError> {
        let product = request.data_product_type;
        let mut offered = product.supported_products().peekable();
        if offered.peek().is_none() {
            return Err(SubscriptionError::UnsupportedProduct(product.to_string()));
        }
        if let Some(version) = &request.product_version {
            if !offered.any(|p| p.product_version == version) {
                return Err(SubscriptionError::UnsupportedProduct(format!(
                    "{product} version {version}"
                )));
            }
        }
        if !request.container_type.is_supported() {
            return Err(SubscriptionError::UnsupportedContainer(
                request.container_type.as_str().to_string(),
            ));
        }
        Ok(())
    }

    async fn send_notification(&self, node: &Node, id: SubscriptionId, event: SubscriptionEvent) {
        if let Err(e) = self.notifier.notify(node, id, event).await {
            warn!(
                mrn = %node.mrn,
                subscription_id = %id,
                event = event.as_str(),
                error = %e,
                "Subscription notification failed"
            );
        }
    }
}

#[async_trait]
impl SubscriptionApi for SubscriptionManagerService {
    async fn subscribe(
        &self,
        node: &Node,
        request: SubscriptionRequest,
    ) -> Result<SubscriptionId, SubscriptionError> {
        info!(mrn = %node.mrn, "Subscription requested");

        if let Some(existing) = self.repository.find_by_node(node.id).await? {
            info!(mrn = %node.mrn, subscription_id = %existing.id, "Existing subscription found");
            return Ok(existing.id);
        }

        Self::check_supported(&request)?;
        if let (Some(start), Some(end)) = (
            request.subscription_period_start,
            request.subscription_period_end,
        ) {
            if end < start {
                return Err(SubscriptionError::InvalidPeriod);
            }
        }
        let geometry = self
            .geo
            .parse_geometry(request.geometry.as_deref(), request.unlocode.as_deref())?;

        let candidate = Subscription {
            id: SubscriptionId::new_random(),
            node: node.id,
            node_mrn: node.mrn.clone(),
            container_type: request.container_type.effective(),
            product_type: request.data_product_type,
            product_version: request.product_version,
            data_reference: request.data_reference,
            geometry,
            original_wkt: request.geometry,
            original_unlocode: request.unlocode,
            period_start: request.subscription_period_start,
            period_end: request.subscription_period_end,
            created_at: self.time_source.now(),
        };
        let candidate_id = candidate.id;

        let stored = self.repository.insert_if_absent(candidate).await?;
        if stored.id != candidate_id {
            // Lost a race with a concurrent subscribe from the same node.
            info!(mrn = %node.mrn, subscription_id = %stored.id, "Existing subscription found");
            return Ok(stored.id);
        }

        info!(mrn = %node.mrn, subscription_id = %stored.id, "Created new subscription");
        self.send_notification(node, stored.id, SubscriptionEvent::SubscriptionCreated)
            .await;
        Ok(stored.id)
    }

    async fn unsubscribe(&self, node: &Node, id: SubscriptionId) -> Result<(), SubscriptionError> {
        let subscription = self
            .repository
            .get(id)
            .await?
            .ok_or(SubscriptionError::NotFound(id))?;

        if subscription.node != node.id {
            warn!(
                subscription_id = %id,
                owner = %subscription.node_mrn,
                requester = %node.mrn,
                "Attempted to remove subscription owned by another node"
            );
            return Err(SubscriptionError::NotFound(id));
        }

        if !self.repository.delete(id).await? {
            return Err(SubscriptionError::NotFound(id));
        }
        info!(mrn = %node.mrn, subscription_id = %id, "Removed subscription");
        self.send_notification(node, id, SubscriptionEvent::SubscriptionRemoved)
            .await;
        Ok(())
    }
}

/// Matches published datasets against stored subscriptions.
///
/// Separate from [`SubscriptionManagerService`] so the delivery engine can
/// depend on it while also acting as the manager's notifier.
pub struct SubscriptionMatcher {
    repository: Arc<dyn SubscriptionRepository>,
}

impl SubscriptionMatcher {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl SubscriberLookup for SubscriptionMatcher {
    async fn find_active_subscribers(
        &self,
        dataset: &PublishedDataset,
        now: Timestamp,
    ) -> Result<Vec<Subscription>, SubscriptionError> {
        let matches = self.repository.find_matching(dataset, now).await?;
        debug!(
            product = %dataset.product_type,
            version = %dataset.product_version,
            count = matches.len(),
            "Matched subscribers"
        );
        Ok(matches)
    }
}
