//! # Inbound Ports (Driving Ports)

use crate::domain::LocatorError;
use crate::ports::outbound::RemoteNodeClient;
use async_trait::async_trait;
use shared_types::Mrn;
use std::sync::Arc;

/// Turns a node MRN into a client for that node's SECOM endpoint.
#[async_trait]
pub trait EndpointResolver: Send + Sync {
    /// Resolve the highest-versioned endpoint registered under `mrn`.
    ///
    /// `NotRegistered` when the directory has nothing for the MRN; any other
    /// failure is a dispatch error.
    async fn resolve_mrn(&self, mrn: &Mrn) -> Result<Arc<dyn RemoteNodeClient>, LocatorError>;
}
