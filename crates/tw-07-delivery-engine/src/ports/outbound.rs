//! # Outbound Ports (Driven Ports)

use crate::domain::Transaction;
use async_trait::async_trait;
use shared_types::{StoreError, TransactionId};

/// Transaction persistence with optimistic concurrency.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Store a new transaction. `Duplicate` if the id exists.
    async fn insert(&self, transaction: Transaction) -> Result<(), StoreError>;

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError>;

    /// Replace the stored record if its revision still equals
    /// `expected_revision`; `Conflict` otherwise.
    async fn update(
        &self,
        transaction: Transaction,
        expected_revision: u64,
    ) -> Result<(), StoreError>;
}
