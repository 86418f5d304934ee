//! # Outbound Ports (Driven Ports)

use crate::domain::{LocatorError, ServiceInstance};
use async_trait::async_trait;
use shared_types::{
    Mrn, ResponseObject, SubscriptionNotificationObject, UploadLinkObject, UploadObject,
};
use std::sync::Arc;

/// The service directory (MSR).
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// All instances registered under `mrn`.
    async fn search_instances(&self, mrn: &Mrn) -> Result<Vec<ServiceInstance>, LocatorError>;

    /// Succeeds when the directory answers at all.
    async fn health_check(&self) -> Result<(), LocatorError>;
}

/// SECOM operations we call on a remote node.
#[async_trait]
pub trait RemoteNodeClient: Send + Sync {
    /// Base endpoint URI of the node.
    fn endpoint(&self) -> &str;

    async fn upload(&self, object: &UploadObject) -> Result<ResponseObject, LocatorError>;

    async fn upload_link(&self, object: &UploadLinkObject)
        -> Result<ResponseObject, LocatorError>;

    async fn subscription_notification(
        &self,
        object: &SubscriptionNotificationObject,
    ) -> Result<ResponseObject, LocatorError>;
}

/// Builds remote node clients for resolved endpoints.
pub trait RemoteClientFactory: Send + Sync {
    fn create(&self, endpoint_uri: &str) -> Result<Arc<dyn RemoteNodeClient>, LocatorError>;
}
