use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::error::NotificationError;
use crate::logging::LogContext;
use crate::models::Transaction;
use crate::notification::Notifier;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    address: &'a str,
    transaction: &'a Transaction,
}

/// POSTs matched transactions as JSON to a fixed URL
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String, timeout_seconds: u64) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        LogContext::new("notification", "initialization")
            .with_metadata("webhook_url", serde_json::json!(url))
            .info("Webhook notifier configured");

        Ok(Self { client, url })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, address: &str, transaction: &Transaction) -> Result<(), NotificationError> {
        let payload = WebhookPayload { address, transaction };

        let response = self.client.post(&self.url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Status { code: status.as_u16() });
        }

        LogContext::new("notification", "webhook")
            .with_address(address)
            .debug("Webhook delivered");
        Ok(())
    }
}
