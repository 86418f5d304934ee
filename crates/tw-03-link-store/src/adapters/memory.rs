//! In-memory link repository.

use crate::domain::Link;
use crate::ports::LinkRepository;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{StoreError, Timestamp, TransactionId};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct InMemoryLinkRepository {
    links: RwLock<HashMap<TransactionId, Link>>,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.links.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.read().is_empty()
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn insert(&self, link: Link) -> Result<(), StoreError> {
        let mut links = self.links.write();
        if links.contains_key(&link.id) {
            return Err(StoreError::Duplicate(link.id.to_string()));
        }
        links.insert(link.id, link);
        Ok(())
    }

    async fn get(&self, id: TransactionId) -> Result<Option<Link>, StoreError> {
        Ok(self.links.read().get(&id).cloned())
    }

    async fn delete(&self, id: TransactionId) -> Result<bool, StoreError> {
        Ok(self.links.write().remove(&id).is_some())
    }

    async fn delete_expired(&self, before: Timestamp) -> Result<usize, StoreError> {
        let mut links = self.links.write();
        let len = links.len();
        links.retain(|_, link| link.expires_at >= before);
        Ok(len - links.len())
    }
}
