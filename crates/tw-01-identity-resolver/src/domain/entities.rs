//! # Node Entity

use serde::{Deserialize, Serialize};
use shared_types::{Mrn, NodeId, Timestamp};

/// Identity record of a remote participant.
///
/// Created lazily on first contact and never deleted by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Opaque identifier, derived deterministically from the MRN.
    pub id: NodeId,
    /// Unique key of the node.
    pub mrn: Mrn,
    /// When the node was first seen.
    pub created_at: Timestamp,
    /// Last ping or acknowledgement from the node.
    pub last_interaction: Option<Timestamp>,
}

impl Node {
    /// A fresh record for `mrn` first seen at `now`.
    pub fn first_contact(mrn: Mrn, now: Timestamp) -> Self {
        Self {
            id: NodeId::for_mrn(&mrn),
            mrn,
            created_at: now,
            last_interaction: None,
        }
    }

    /// Record an interaction, returning the previous one.
    pub fn record_interaction(&mut self, at: Timestamp) -> Option<Timestamp> {
        self.last_interaction.replace(at)
    }
}
