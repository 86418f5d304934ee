//! # Outbound Ports (Driven Ports)

use crate::domain::{Dataset, DatasetQuery};
use async_trait::async_trait;
use shared_types::{DataReference, StoreError};

/// Storage for ingested datasets and the references between them.
#[async_trait]
pub trait DatasetCatalogue: Send + Sync {
    /// Insert or replace by data reference. The dataset joins the pending
    /// list until the next [`take_pending`](Self::take_pending).
    async fn upsert(&self, dataset: Dataset) -> Result<(), StoreError>;

    /// Drain the datasets awaiting publication, oldest upsert first. Each
    /// reference appears once however often it was upserted.
    async fn take_pending(&self) -> Result<Vec<DataReference>, StoreError>;

    async fn get(&self, id: DataReference) -> Result<Option<Dataset>, StoreError>;

    /// Datasets matching `query`, oldest first.
    async fn find(&self, query: &DatasetQuery) -> Result<Vec<Dataset>, StoreError>;

    /// Add the edge `from -> to`. Adding an existing edge is a no-op.
    async fn add_reference(&self, from: DataReference, to: DataReference)
        -> Result<(), StoreError>;

    /// Remove every edge leaving `from`.
    async fn clear_references(&self, from: DataReference) -> Result<(), StoreError>;

    /// Targets of `from`, in insertion order.
    async fn references(&self, from: DataReference) -> Result<Vec<DataReference>, StoreError>;
}
