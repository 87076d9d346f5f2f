use async_trait::async_trait;

mod log_notifier;
mod webhook;

pub use log_notifier::LogNotifier;
pub use webhook::WebhookNotifier;

use crate::error::NotificationError;
use crate::models::Transaction;

/// One-way sink invoked once per matched transaction
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, address: &str, transaction: &Transaction) -> Result<(), NotificationError>;
}
