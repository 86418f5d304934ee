//! # Publish Inputs and Reports

use bytes::Bytes;
use shared_types::{Mrn, SubscriptionId, TransactionId};
use tw_06_subscription_manager::PublishedDataset;

/// A dataset to push to its subscribers.
#[derive(Debug, Clone)]
pub struct Publication {
    pub dataset: PublishedDataset,
    /// Encoded dataset bytes.
    pub payload: Bytes,
}

/// A successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub subscription: SubscriptionId,
    pub recipient: Mrn,
    pub transaction: TransactionId,
    /// True when the payload went through the link store.
    pub as_link: bool,
}

/// A send that failed; the remaining subscribers were still served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub subscription: SubscriptionId,
    pub recipient: Mrn,
    /// Set when the failure happened after the transaction was recorded.
    pub transaction: Option<TransactionId>,
    pub error: String,
}

/// Outcome of one publish.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Subscriptions that matched the dataset.
    pub matched: usize,
    pub delivered: Vec<Delivery>,
    pub failed: Vec<DeliveryFailure>,
}

impl PublishReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
