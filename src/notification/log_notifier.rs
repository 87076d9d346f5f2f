use async_trait::async_trait;
use serde_json::json;

use crate::error::NotificationError;
use crate::logging::LogContext;
use crate::models::Transaction;
use crate::notification::Notifier;

/// Writes each matched transaction to the log
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        LogNotifier
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, address: &str, transaction: &Transaction) -> Result<(), NotificationError> {
        LogContext::new("notification", "notify")
            .with_address(address)
            .with_metadata("transaction", json!(transaction))
            .info(&format!("New transaction for address {}", address));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        let transaction = Transaction {
            block_hash: "0xabc".to_string(),
            block_number: "0x1".to_string(),
            from: "0x123".to_string(),
            to: "0x456".to_string(),
            value: "0x10".to_string(),
        };

        assert!(LogNotifier::new().notify("0x123", &transaction).await.is_ok());
    }
}
