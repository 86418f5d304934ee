//! # In-Memory Dataset Catalogue

use crate::domain::{Dataset, DatasetQuery};
use crate::ports::DatasetCatalogue;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_types::{DataReference, StoreError};
use std::collections::HashMap;

/// Datasets keyed by data reference, references as an adjacency list, and
/// the references still waiting to be published.
#[derive(Default)]
pub struct InMemoryDatasetCatalogue {
    datasets: RwLock<HashMap<DataReference, Dataset>>,
    references: RwLock<HashMap<DataReference, Vec<DataReference>>>,
    pending: Mutex<Vec<DataReference>>,
}

impl InMemoryDatasetCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.datasets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.read().is_empty()
    }
}

#[async_trait]
impl DatasetCatalogue for InMemoryDatasetCatalogue {
    async fn upsert(&self, dataset: Dataset) -> Result<(), StoreError> {
        let id = dataset.data_reference;
        self.datasets.write().insert(id, dataset);
        let mut pending = self.pending.lock();
        if !pending.contains(&id) {
            pending.push(id);
        }
        Ok(())
    }

    async fn take_pending(&self) -> Result<Vec<DataReference>, StoreError> {
        Ok(std::mem::take(&mut *self.pending.lock()))
    }

    async fn get(&self, id: DataReference) -> Result<Option<Dataset>, StoreError> {
        Ok(self.datasets.read().get(&id).cloned())
    }

    async fn find(&self, query: &DatasetQuery) -> Result<Vec<Dataset>, StoreError> {
        let mut found: Vec<Dataset> = self
            .datasets
            .read()
            .values()
            .filter(|d| query.matches(d))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.mrn.cmp(&b.mrn))
        });
        Ok(found)
    }

    async fn add_reference(
        &self,
        from: DataReference,
        to: DataReference,
    ) -> Result<(), StoreError> {
        let mut references = self.references.write();
        let targets = references.entry(from).or_default();
        if !targets.contains(&to) {
            targets.push(to);
        }
        Ok(())
    }

    async fn clear_references(&self, from: DataReference) -> Result<(), StoreError> {
        self.references.write().remove(&from);
        Ok(())
    }

    async fn references(&self, from: DataReference) -> Result<Vec<DataReference>, StoreError> {
        Ok(self
            .references
            .read()
            .get(&from)
            .cloned()
            .unwrap_or_default())
    }
}
