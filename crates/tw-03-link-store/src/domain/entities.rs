//! # Link Entity

use bytes::Bytes;
use shared_types::{NodeId, Timestamp, TransactionId};

/// A stored payload reachable through the transaction identifier that
/// produced it.
///
/// The payload is an immutable `Bytes` buffer: readers either get the whole
/// buffer or nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: TransactionId,
    /// The only node allowed to read the link.
    pub owner: NodeId,
    pub data: Bytes,
    /// Payload length in bytes.
    pub size: u64,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl Link {
    pub fn new(owner: NodeId, data: Bytes, created_at: Timestamp, expires_at: Timestamp) -> Self {
        Self {
            id: TransactionId::new_random(),
            owner,
            size: data.len() as u64,
            data,
            created_at,
            expires_at,
        }
    }

    /// A link is expired from its expiry instant onward.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }
}
