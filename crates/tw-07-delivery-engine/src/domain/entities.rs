//! # Transaction Entity
//!
//! One record per acknowledgeable outbound message. The payload variant
//! says whether bytes went inline or behind a link.
//!
//! ```text
//!          ┌──────────────► ACKNOWLEDGED
//!   OPEN ──┼──────────────► OPENED
//!          └──────────────► ERROR
//! ```
//!
//! All three targets are terminal.

use crate::domain::errors::DeliveryError;
use shared_types::{AckType, Mrn, NackType, NodeId, Timestamp, TransactionId};
use std::fmt;

/// How the payload of a transaction was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionPayload {
    None,
    Inline { size: u64 },
    Link { expires_at: Timestamp },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionState {
    Open,
    Acknowledged,
    Opened,
    Error,
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Open => "OPEN",
            Self::Acknowledged => "ACKNOWLEDGED",
            Self::Opened => "OPENED",
            Self::Error => "ERROR",
        })
    }
}

/// Result of applying an acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AckOutcome {
    /// The transaction moved out of `OPEN`.
    Applied(Transaction),
    /// The same acknowledgement had already been applied.
    AlreadyApplied(Transaction),
}

impl AckOutcome {
    pub fn transaction(&self) -> &Transaction {
        match self {
            Self::Applied(tx) | Self::AlreadyApplied(tx) => tx,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: TransactionId,
    /// The only node allowed to acknowledge.
    pub owner: NodeId,
    pub owner_mrn: Mrn,
    pub payload: TransactionPayload,
    pub created_at: Timestamp,
    pub acknowledged_at: Option<Timestamp>,
    pub opened_at: Option<Timestamp>,
    pub error_at: Option<Timestamp>,
    pub nack_type: Option<NackType>,
    pub dispatched_at: Option<Timestamp>,
    pub dispatch_error: Option<String>,
    /// Bumped on every stored update.
    pub revision: u64,
}

impl Transaction {
    pub fn open(
        id: TransactionId,
        owner: NodeId,
        owner_mrn: Mrn,
        payload: TransactionPayload,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            owner,
            owner_mrn,
            payload,
            created_at,
            acknowledged_at: None,
            opened_at: None,
            error_at: None,
            nack_type: None,
            dispatched_at: None,
            dispatch_error: None,
            revision: 0,
        }
    }

    pub fn state(&self) -> TransactionState {
        if self.error_at.is_some() {
            TransactionState::Error
        } else if self.opened_at.is_some() {
            TransactionState::Opened
        } else if self.acknowledged_at.is_some() {
            TransactionState::Acknowledged
        } else {
            TransactionState::Open
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state() != TransactionState::Open
    }

    /// Apply an acknowledgement received at `at`.
    ///
    /// The returned transaction in `Applied` carries the next revision. A
    /// repeat of the acknowledgement that closed the transaction is
    /// `AlreadyApplied`; any other acknowledgement on a closed transaction
    /// is rejected.
    pub fn apply_ack(
        &self,
        ack_type: AckType,
        nack_type: Option<NackType>,
        at: Timestamp,
    ) -> Result<AckOutcome, DeliveryError> {
        if ack_type == AckType::Error && nack_type.is_none() {
            return Err(DeliveryError::MissingNackType);
        }

        let target = match ack_type {
            AckType::DeliveredAck => TransactionState::Acknowledged,
            AckType::OpenedAck => TransactionState::Opened,
            AckType::Error => TransactionState::Error,
        };

        let state = self.state();
        if state != TransactionState::Open {
            let same_nack = ack_type != AckType::Error || self.nack_type == nack_type;
            return if state == target && same_nack {
                Ok(AckOutcome::AlreadyApplied(self.clone()))
            } else {
                Err(DeliveryError::AlreadyTerminal {
                    id: self.id,
                    state,
                    ack: ack_type,
                })
            };
        }

        let mut next = self.clone();
        match ack_type {
            AckType::DeliveredAck => next.acknowledged_at = Some(at),
            AckType::OpenedAck => next.opened_at = Some(at),
            AckType::Error => {
                next.error_at = Some(at);
                next.nack_type = nack_type;
            }
        }
        next.revision += 1;
        Ok(AckOutcome::Applied(next))
    }
}
