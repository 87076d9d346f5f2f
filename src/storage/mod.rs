pub mod memory;

pub use memory::MemoryStorage;

use crate::error::StorageError;
use crate::models::Transaction;

/// Subscription registry plus per-address transaction log.
///
/// Implementations are shared between the poll loop and request handlers, so
/// every method takes `&self` and must synchronize internally.
pub trait Storage: Send + Sync {
    /// Idempotent; subscribing twice keeps one entry
    fn subscribe_address(&self, address: &str) -> Result<(), StorageError>;

    /// Snapshot of the current subscription set, in no particular order
    fn subscribed_addresses(&self) -> Result<Vec<String>, StorageError>;

    /// Append to the address's log
    fn save_transaction(&self, address: &str, transaction: Transaction) -> Result<(), StorageError>;

    /// Log for the address in insertion order; empty for unknown addresses
    fn transactions(&self, address: &str) -> Result<Vec<Transaction>, StorageError>;
}
