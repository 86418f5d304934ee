//! # Service Locator Subsystem (tw-05)
//!
//! Resolves a node MRN to a client for the highest-versioned SECOM endpoint
//! registered for it in the service directory.
//!
//! The directory client is built once at startup and checked by
//! [`ServiceLocator::connect`]; the runtime refuses to start if it cannot be
//! reached. Resolutions are not cached unless a [`ResolutionCache`] with a
//! non-zero TTL is installed.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{
    HttpDirectoryClient, HttpRemoteClientFactory, HttpRemoteNodeClient, ResolutionCache,
};
pub use domain::{compare_versions, select_latest, LocatorError, ServiceInstance};
pub use ports::{DirectoryClient, EndpointResolver, RemoteClientFactory, RemoteNodeClient};
pub use service::ServiceLocator;
