//! # HTTP Adapters
//!
//! reqwest implementations of the directory and remote node ports. The
//! `reqwest::Client` is built by the trust provider so every call carries
//! the node's TLS identity.

use crate::domain::{LocatorError, SearchFilter, SearchResponse, ServiceInstance};
use crate::ports::{DirectoryClient, RemoteClientFactory, RemoteNodeClient};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{
    Mrn, ResponseObject, SubscriptionNotificationObject, UploadLinkObject, UploadObject,
};
use std::sync::Arc;
use tracing::debug;

pub const SEARCH_SERVICE_PATH: &str = "v1/searchService";
pub const UPLOAD_PATH: &str = "v1/object";
pub const UPLOAD_LINK_PATH: &str = "v1/object/link";
pub const SUBSCRIPTION_NOTIFICATION_PATH: &str = "v1/subscription/notification";

/// Parse `raw` as a base URL, making sure joins append to its path.
fn base_url(raw: &str) -> Result<Url, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("URL is empty".to_string());
    }
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash).map_err(|e| format!("{trimmed}: {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("{trimmed}: unsupported scheme {other}")),
    }
}

async fn post_json<B: Serialize + ?Sized, R: DeserializeOwned>(
    client: &Client,
    url: Url,
    body: &B,
) -> Result<R, String> {
    let response = client
        .post(url.clone())
        .json(body)
        .send()
        .await
        .map_err(|e| {
            if e.is_connect() {
                format!("cannot connect to {url}")
            } else if e.is_timeout() {
                format!("timed out calling {url}")
            } else {
                e.to_string()
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(format!("{url} returned {status}: {body}"));
    }

    response
        .json::<R>()
        .await
        .map_err(|e| format!("unreadable response from {url}: {e}"))
}

// =============================================================================
// DIRECTORY
// =============================================================================

/// Service directory reached over HTTP(S).
pub struct HttpDirectoryClient {
    client: Client,
    base: Url,
}

impl HttpDirectoryClient {
    pub fn new(client: Client, directory_url: &str) -> Result<Self, LocatorError> {
        let base = base_url(directory_url).map_err(LocatorError::InvalidDirectory)?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }
}

#[async_trait]
impl DirectoryClient for HttpDirectoryClient {
    async fn search_instances(&self, mrn: &Mrn) -> Result<Vec<ServiceInstance>, LocatorError> {
        let url = self
            .base
            .join(SEARCH_SERVICE_PATH)
            .map_err(|e| LocatorError::Directory(e.to_string()))?;
        let response: SearchResponse =
            post_json(&self.client, url, &SearchFilter::for_instance(mrn.as_str()))
                .await
                .map_err(LocatorError::Directory)?;
        let instances = response.into_instances();
        debug!(%mrn, count = instances.len(), "Directory search returned");
        Ok(instances)
    }

    async fn health_check(&self) -> Result<(), LocatorError> {
        // Any HTTP answer proves the directory is reachable.
        self.client
            .get(self.base.clone())
            .send()
            .await
            .map(|_| ())
            .map_err(|e| LocatorError::Directory(format!("{} unreachable: {e}", self.base)))
    }
}

// =============================================================================
// REMOTE NODES
// =============================================================================

/// A remote SECOM node.
pub struct HttpRemoteNodeClient {
    client: Client,
    endpoint: String,
    base: Url,
}

impl HttpRemoteNodeClient {
    pub fn new(client: Client, endpoint_uri: &str) -> Result<Self, LocatorError> {
        let base = base_url(endpoint_uri).map_err(|reason| LocatorError::ClientConstruction {
            endpoint: endpoint_uri.to_string(),
            reason,
        })?;
        Ok(Self {
            client,
            endpoint: endpoint_uri.trim().to_string(),
            base,
        })
    }

    async fn call<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ResponseObject, LocatorError> {
        let remote_err = |reason: String| LocatorError::Remote {
            endpoint: self.endpoint.clone(),
            reason,
        };
        let url = self.base.join(path).map_err(|e| remote_err(e.to_string()))?;
        post_json(&self.client, url, body).await.map_err(remote_err)
    }
}

#[async_trait]
impl RemoteNodeClient for HttpRemoteNodeClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn upload(&self, object: &UploadObject) -> Result<ResponseObject, LocatorError> {
        self.call(UPLOAD_PATH, object).await
    }

    async fn upload_link(
        &self,
        object: &UploadLinkObject,
    ) -> Result<ResponseObject, LocatorError> {
        self.call(UPLOAD_LINK_PATH, object).await
    }

    async fn subscription_notification(
        &self,
        object: &SubscriptionNotificationObject,
    ) -> Result<ResponseObject, LocatorError> {
        self.call(SUBSCRIPTION_NOTIFICATION_PATH, object).await
    }
}

/// Creates [`HttpRemoteNodeClient`]s sharing one connection pool.
#[derive(Clone)]
pub struct HttpRemoteClientFactory {
    client: Client,
}

impl HttpRemoteClientFactory {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl RemoteClientFactory for HttpRemoteClientFactory {
    fn create(&self, endpoint_uri: &str) -> Result<Arc<dyn RemoteNodeClient>, LocatorError> {
        Ok(Arc::new(HttpRemoteNodeClient::new(
            self.client.clone(),
            endpoint_uri,
        )?))
    }
}
