//! # Delivery Errors

use crate::domain::entities::TransactionState;
use shared_types::{AckType, ErrorKind, SecomError, StoreError, TransactionId};
use thiserror::Error;
use tw_03_link_store::LinkError;
use tw_04_trust_provider::TrustError;
use tw_05_service_locator::LocatorError;
use tw_06_subscription_manager::SubscriptionError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// Unknown or owned by another node.
    #[error("Unknown transaction {0}")]
    TransactionNotFound(TransactionId),

    #[error("An ERROR acknowledgement requires a nack type")]
    MissingNackType,

    /// A different acknowledgement already closed the transaction.
    #[error("Transaction {id} is already {state}; {ack:?} rejected")]
    AlreadyTerminal {
        id: TransactionId,
        state: TransactionState,
        ack: AckType,
    },

    #[error("Invalid envelope signature: {0}")]
    InvalidSignature(String),

    #[error("Send to {recipient} timed out")]
    Timeout { recipient: String },

    /// Compare-and-swap retries exhausted.
    #[error("Transaction {0} is being updated concurrently")]
    ConcurrentUpdate(TransactionId),

    #[error(transparent)]
    Trust(#[from] TrustError),

    #[error(transparent)]
    Locator(#[from] LocatorError),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Subscription(#[from] SubscriptionError),

    #[error("Transaction repository failure: {0}")]
    Storage(#[from] StoreError),
}

impl DeliveryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TransactionNotFound(_) => ErrorKind::NotFound,
            Self::MissingNackType | Self::AlreadyTerminal { .. } => ErrorKind::Validation,
            Self::InvalidSignature(_) => ErrorKind::InvalidCredential,
            Self::Timeout { .. } => ErrorKind::Dispatch,
            Self::ConcurrentUpdate(_) | Self::Storage(_) => ErrorKind::Storage,
            Self::Trust(e) => e.kind(),
            Self::Locator(e) => e.kind(),
            Self::Link(e) => e.kind(),
            Self::Subscription(e) => e.kind(),
        }
    }
}

impl From<DeliveryError> for SecomError {
    fn from(err: DeliveryError) -> Self {
        SecomError::new(err.kind(), err.to_string())
    }
}
