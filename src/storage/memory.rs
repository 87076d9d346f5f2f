use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::StorageError;
use crate::models::Transaction;
use crate::storage::Storage;

/// Process-lifetime storage; nothing is written to disk
#[derive(Clone, Default)]
pub struct MemoryStorage {
    addresses: Arc<Mutex<HashSet<String>>>,
    transactions: Arc<Mutex<HashMap<String, Vec<Transaction>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|_| StorageError::Lock("Failed to acquire lock".to_string()))
}

impl Storage for MemoryStorage {
    fn subscribe_address(&self, address: &str) -> Result<(), StorageError> {
        lock(&self.addresses)?.insert(address.to_string());
        Ok(())
    }

    fn subscribed_addresses(&self) -> Result<Vec<String>, StorageError> {
        Ok(lock(&self.addresses)?.iter().cloned().collect())
    }

    fn save_transaction(&self, address: &str, transaction: Transaction) -> Result<(), StorageError> {
        lock(&self.transactions)?
            .entry(address.to_string())
            .or_default()
            .push(transaction);
        Ok(())
    }

    fn transactions(&self, address: &str) -> Result<Vec<Transaction>, StorageError> {
        Ok(lock(&self.transactions)?
            .get(address)
            .cloned()
            .unwrap_or_default())
    }
}
