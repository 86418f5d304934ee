//! In-memory node repository.

use crate::domain::Node;
use crate::ports::NodeRepository;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Mrn, StoreError, Timestamp};
use std::collections::HashMap;

/// Node repository backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryNodeRepository {
    nodes: RwLock<HashMap<Mrn, Node>>,
}

impl InMemoryNodeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored nodes.
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }
}

#[async_trait]
impl NodeRepository for InMemoryNodeRepository {
    async fn find_by_mrn(&self, mrn: &Mrn) -> Result<Option<Node>, StoreError> {
        Ok(self.nodes.read().get(mrn).cloned())
    }

    async fn insert_if_absent(&self, node: Node) -> Result<Node, StoreError> {
        let mut nodes = self.nodes.write();
        Ok(nodes.entry(node.mrn.clone()).or_insert(node).clone())
    }

    async fn touch(
        &self,
        mrn: &Mrn,
        at: Timestamp,
    ) -> Result<Option<Option<Timestamp>>, StoreError> {
        let mut nodes = self.nodes.write();
        Ok(nodes.get_mut(mrn).map(|node| node.record_interaction(at)))
    }
}
