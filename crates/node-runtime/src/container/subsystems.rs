//! # Subsystem Container
//!
//! Holds all subsystem instances and wires them together.
//!
//! ## Initialization Order
//!
//! ```text
//! Level 0: Trust Provider (tw-04), Service Locator (tw-05)   fatal on failure
//! Level 1: Identity (tw-01), Geospatial Filter (tw-02), Link Store (tw-03)
//! Level 2: Delivery Engine (tw-07)
//! Level 3: Subscription Manager (tw-06), notifying through the engine
//! Level 4: Node API (tw-08)
//! ```
//!
//! The subscription manager and the delivery engine share one repository:
//! the manager writes through it and the engine reads matches through a
//! `SubscriptionMatcher`, so neither holds the other.

use crate::adapters::MeteredLinkStore;
use crate::container::config::NodeConfig;
use anyhow::{Context, Result};
use shared_bus::InMemoryEventBus;
use shared_types::{SystemTimeSource, TimeSource};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};
use tw_01_identity_resolver::{IdentityResolverService, InMemoryNodeRepository};
use tw_02_geospatial_filter::{CodedLocationTable, GeospatialFilter};
use tw_03_link_store::{InMemoryLinkRepository, LinkStoreService};
use tw_04_trust_provider::{KeyStoreSource, TrustProvider, TrustStoreSource};
use tw_05_service_locator::{
    EndpointResolver, HttpDirectoryClient, HttpRemoteClientFactory, ResolutionCache,
    ServiceLocator,
};
use tw_06_subscription_manager::{
    InMemorySubscriptionRepository, SubscriptionManagerService, SubscriptionMatcher,
};
use tw_07_delivery_engine::{DeliveryDependencies, DeliveryEngine, InMemoryTransactionRepository};
use tw_08_node_api::{EventingNotifier, InMemoryDatasetCatalogue, NodeApiDependencies, SecomNode};

/// Central container holding all subsystem instances.
pub struct SubsystemContainer {
    pub config: NodeConfig,
    /// Sole channel for cross-subsystem events.
    pub event_bus: Arc<InMemoryEventBus>,
    pub trust: Arc<TrustProvider>,
    pub links: Arc<MeteredLinkStore>,
    pub delivery: Arc<DeliveryEngine>,
    /// The SECOM facade handed to the transport layer.
    pub api: Arc<SecomNode>,
    pub time_source: Arc<dyn TimeSource>,
}

impl SubsystemContainer {
    /// Load trust material, connect to the service directory and wire every
    /// subsystem. Either failure aborts startup.
    #[instrument(skip_all, fields(mrn = %config.node.mrn))]
    pub async fn build(config: NodeConfig) -> Result<Self> {
        let algorithm = config.trust.algorithm()?;
        let key_store = KeyStoreSource::new(
            &config.trust.key_store_path,
            config.trust.key_store_password.clone(),
        );
        let trust_store = TrustStoreSource::new(
            &config.trust.trust_store_path,
            config.trust.trust_store_password.clone(),
        )
            .with_anchor_alias(config.trust.anchor_alias.clone());
        let trust = Arc::new(
            TrustProvider::load(&key_store, &trust_store, algorithm)
                .context("Failed to load trust material")?,
        );

        let settings = config
            .directory
            .client_settings(config.trust.insecure_accept_all);
        let client = trust
            .http_client(&settings)
            .context("Failed to build outbound HTTPS client")?;
        let directory = HttpDirectoryClient::new(client.clone(), &config.directory.url)
            .context("Invalid service directory URL")?;
        let locator = ServiceLocator::connect(
            Arc::new(directory),
            Arc::new(HttpRemoteClientFactory::new(client)),
        )
        .await
        .with_context(|| format!("Service directory {} unreachable", config.directory.url))?;
        let locator = if config.directory.cache_ttl_secs > 0 {
            locator.with_cache(ResolutionCache::new(Duration::from_secs(
                config.directory.cache_ttl_secs,
            )))
        } else {
            locator
        };

        Self::assemble(config, trust, Arc::new(locator), Arc::new(SystemTimeSource))
    }

    /// Wire the subsystems around already-built trust and resolver
    /// collaborators.
    pub fn assemble(
        config: NodeConfig,
        trust: Arc<TrustProvider>,
        resolver: Arc<dyn EndpointResolver>,
        time_source: Arc<dyn TimeSource>,
    ) -> Result<Self> {
        let event_bus = Arc::new(InMemoryEventBus::new());

        let geo = match &config.geo.unlocode_table {
            Some(path) => {
                let table = CodedLocationTable::from_path(path)
                    .with_context(|| format!("Failed to load UN/LOCODE table {}", path.display()))?;
                GeospatialFilter::new(Arc::new(table))
            }
            None => GeospatialFilter::with_builtin_table()
                .context("Failed to load built-in UN/LOCODE table")?,
        };
        let geo = Arc::new(geo);
        info!(locations = geo.locations().len(), "[tw-02] Geospatial filter ready");

        let identity = Arc::new(IdentityResolverService::new(
            Arc::new(InMemoryNodeRepository::new()),
            time_source.clone(),
        ));

        let links = Arc::new(MeteredLinkStore::new(Arc::new(LinkStoreService::new(
            Arc::new(InMemoryLinkRepository::new()),
            time_source.clone(),
        ))));

        let subscription_repository = Arc::new(InMemorySubscriptionRepository::new());
        let delivery = Arc::new(DeliveryEngine::new(
            DeliveryDependencies {
                subscribers: Arc::new(SubscriptionMatcher::new(subscription_repository.clone())),
                transactions: Arc::new(InMemoryTransactionRepository::new()),
                links: links.clone(),
                signer: trust.clone(),
                resolver,
                time_source: time_source.clone(),
            },
            config.delivery.engine_config(),
        ));

        let notifier = Arc::new(EventingNotifier::new(delivery.clone(), event_bus.clone()));
        let subscriptions = Arc::new(SubscriptionManagerService::new(
            subscription_repository,
            geo.clone(),
            notifier,
            time_source.clone(),
        ));

        let api = Arc::new(SecomNode::new(NodeApiDependencies {
            identity,
            subscriptions,
            delivery: delivery.clone(),
            links: links.clone(),
            catalogue: Arc::new(InMemoryDatasetCatalogue::new()),
            geo,
            signer: trust.clone(),
            events: event_bus.clone(),
            time_source: time_source.clone(),
        }));

        info!(mrn = %config.node.mrn, "All subsystems wired");

        Ok(Self {
            config,
            event_bus,
            trust,
            links,
            delivery,
            api,
            time_source,
        })
    }
}
