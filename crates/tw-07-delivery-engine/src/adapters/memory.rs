//! In-memory transaction repository.

use crate::domain::Transaction;
use crate::ports::TransactionRepository;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{StoreError, TransactionId};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct InMemoryTransactionRepository {
    transactions: RwLock<HashMap<TransactionId, Transaction>>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.transactions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.read().is_empty()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn insert(&self, transaction: Transaction) -> Result<(), StoreError> {
        let mut transactions = self.transactions.write();
        if transactions.contains_key(&transaction.id) {
            return Err(StoreError::Duplicate(transaction.id.to_string()));
        }
        transactions.insert(transaction.id, transaction);
        Ok(())
    }

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        Ok(self.transactions.read().get(&id).cloned())
    }

    async fn update(
        &self,
        transaction: Transaction,
        expected_revision: u64,
    ) -> Result<(), StoreError> {
        let mut transactions = self.transactions.write();
        let stored = transactions
            .get_mut(&transaction.id)
            .ok_or_else(|| StoreError::Backend(format!("transaction {} vanished", transaction.id)))?;
        if stored.revision != expected_revision {
            return Err(StoreError::Conflict(format!(
                "transaction {} at revision {}, expected {}",
                transaction.id, stored.revision, expected_revision
            )));
        }
        *stored = transaction;
        Ok(())
    }
}
