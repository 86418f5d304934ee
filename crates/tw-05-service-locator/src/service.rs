//! # Service Locator Service

use crate::adapters::ResolutionCache;
use crate::domain::{select_latest, LocatorError};
use crate::ports::{DirectoryClient, EndpointResolver, RemoteClientFactory, RemoteNodeClient};
use async_trait::async_trait;
use shared_types::Mrn;
use std::sync::Arc;
use tracing::{error, info};

pub struct ServiceLocator {
    directory: Arc<dyn DirectoryClient>,
    clients: Arc<dyn RemoteClientFactory>,
    cache: ResolutionCache,
}

impl ServiceLocator {
    /// Build a locator after checking the directory answers. The caller
    /// treats an error as fatal.
    pub async fn connect(
        directory: Arc<dyn DirectoryClient>,
        clients: Arc<dyn RemoteClientFactory>,
    ) -> Result<Self, LocatorError> {
        directory.health_check().await?;
        Ok(Self::new(directory, clients))
    }

    /// Build a locator without probing the directory.
    pub fn new(directory: Arc<dyn DirectoryClient>, clients: Arc<dyn RemoteClientFactory>) -> Self {
        Self {
            directory,
            clients,
            cache: ResolutionCache::disabled(),
        }
    }

    pub fn with_cache(mut self, cache: ResolutionCache) -> Self {
        self.cache = cache;
        self
    }
}

#[async_trait]
impl EndpointResolver for ServiceLocator {
    async fn resolve_mrn(&self, mrn: &Mrn) -> Result<Arc<dyn RemoteNodeClient>, LocatorError> {
        let instance = match self.cache.get(mrn.as_str()) {
            Some(hit) => hit,
            None => {
                info!(%mrn, "Resolving MRN");
                let instances = self.directory.search_instances(mrn).await?;
                let latest = select_latest(&instances)
                    .cloned()
                    .ok_or_else(|| LocatorError::NotRegistered(mrn.to_string()))?;
                self.cache.put(mrn.as_str(), latest.clone());
                latest
            }
        };

        info!(%mrn, endpoint = %instance.endpoint_uri, version = %instance.version, "Resolved MRN");
        self.clients.create(&instance.endpoint_uri).map_err(|e| {
            error!(%mrn, error = %e, "Remote client could not be created");
            self.cache.invalidate(mrn.as_str());
            e
        })
    }
}
