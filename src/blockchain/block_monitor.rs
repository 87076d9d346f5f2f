use log::{debug, info};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::time::sleep;

use crate::blockchain::block_processor::filter_for_address;
use crate::blockchain::{BlockProcessor, RpcGateway};
use crate::config::PollingConfig;
use crate::error::ParserError;
use crate::logging::{ErrorLogger, LogContext, MetricsLogger, PerformanceMonitor};
use crate::models::Transaction;
use crate::notification::Notifier;
use crate::storage::Storage;

pub struct BlockMonitorConfig {
    pub poll_interval: Duration,
    /// Fetch the block once per height instead of once per subscribed address
    pub shared_block_fetch: bool,
}

impl Default for BlockMonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            shared_block_fetch: false,
        }
    }
}

impl From<&PollingConfig> for BlockMonitorConfig {
    fn from(config: &PollingConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.poll_interval_seconds),
            shared_block_fetch: config.shared_block_fetch,
        }
    }
}

/// What a single poll iteration did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Height fetch or decode failed; height left untouched
    Failed,
    /// Height is the same as last time; no block was fetched
    Unchanged { block_number: u64 },
    /// Height changed and the block was processed for every subscribed address
    NewBlock { block_number: u64, matched: usize },
}

/// Watches the chain head and records transactions touching subscribed addresses.
///
/// Built once at startup and shared (`Arc<BlockMonitor>`) between the poll
/// task and the HTTP handlers.
pub struct BlockMonitor {
    processor: BlockProcessor,
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
    current_block: AtomicU64,
    poll_lock: Mutex<()>,
    shutdown_tx: watch::Sender<bool>,
    pub config: BlockMonitorConfig,
}

impl BlockMonitor {
    pub fn new(
        gateway: Arc<dyn RpcGateway>,
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn Notifier>,
        config: Option<BlockMonitorConfig>,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            processor: BlockProcessor::new(gateway),
            storage,
            notifier,
            current_block: AtomicU64::new(0),
            poll_lock: Mutex::new(()),
            shutdown_tx,
            config: config.unwrap_or_default(),
        }
    }

    /// Last observed chain height, 0 before the first successful poll
    pub fn current_block(&self) -> u64 {
        self.current_block.load(Ordering::Acquire)
    }

    /// Add an address to the subscription set. Returns false only on an internal failure.
    pub fn subscribe(&self, address: &str) -> bool {
        match self.storage.subscribe_address(address) {
            Ok(()) => {
                LogContext::new("block_monitor", "subscribe")
                    .with_address(address)
                    .info("Address subscribed");
                true
            }
            Err(e) => {
                ErrorLogger::log_error(
                    &e.into(),
                    Some(LogContext::new("block_monitor", "subscribe").with_address(address)),
                );
                false
            }
        }
    }

    /// Recorded transactions for an address, oldest first. Never fails.
    pub fn get_transactions(&self, address: &str) -> Vec<Transaction> {
        self.storage.transactions(address).unwrap_or_else(|e| {
            ErrorLogger::log_error(
                &e.into(),
                Some(LogContext::new("block_monitor", "get_transactions").with_address(address)),
            );
            Vec::new()
        })
    }

    /// Fetch the chain height and store it. Returns the new height when it differs from the previous one.
    async fn update_current_block(&self) -> Result<Option<u64>, ParserError> {
        let previous = self.current_block();
        let latest = self.processor.fetch_block_number().await?;

        if latest == previous {
            return Ok(None);
        }

        self.current_block.store(latest, Ordering::Release);
        MetricsLogger::log_new_block(previous, latest, self.subscribed_count());
        Ok(Some(latest))
    }

    /// Run one iteration: check the height and, on change, process the new block
    pub async fn poll_once(&self) -> PollOutcome {
        let _guard = self.poll_lock.lock().await;
        let monitor = PerformanceMonitor::new("poll_iteration");

        let block_number = match self.update_current_block().await {
            Ok(Some(block_number)) => block_number,
            Ok(None) => {
                let block_number = self.current_block();
                debug!("No new block, height still {}", block_number);
                return PollOutcome::Unchanged { block_number };
            }
            Err(e) => {
                ErrorLogger::log_error(&e, Some(LogContext::new("block_monitor", "update_current_block")));
                return PollOutcome::Failed;
            }
        };

        let addresses = match self.storage.subscribed_addresses() {
            Ok(addresses) => addresses,
            Err(e) => {
                ErrorLogger::log_error(
                    &e.into(),
                    Some(LogContext::new("block_monitor", "subscribed_addresses").with_block_number(block_number)),
                );
                Vec::new()
            }
        };

        let matched = if self.config.shared_block_fetch {
            self.process_block_shared(&addresses, block_number).await
        } else {
            let mut matched = 0;
            for address in &addresses {
                match self.process_address(address, block_number).await {
                    Ok(count) => matched += count,
                    Err(e) => ErrorLogger::log_error(
                        &e,
                        Some(
                            LogContext::new("block_monitor", "process_address")
                                .with_address(address)
                                .with_block_number(block_number),
                        ),
                    ),
                }
            }
            matched
        };

        MetricsLogger::log_poll_iteration(block_number, matched, monitor.elapsed_ms());
        PollOutcome::NewBlock { block_number, matched }
    }

    /// Fetch the block for a single address and record what matches it
    pub async fn process_address(&self, address: &str, block_number: u64) -> Result<usize, ParserError> {
        let transactions = self.processor.fetch_block_transactions(block_number).await?;
        Ok(self.record_matches(address, &transactions).await)
    }

    async fn process_block_shared(&self, addresses: &[String], block_number: u64) -> usize {
        if addresses.is_empty() {
            return 0;
        }

        let transactions = match self.processor.fetch_block_transactions(block_number).await {
            Ok(transactions) => transactions,
            Err(e) => {
                ErrorLogger::log_error(
                    &e,
                    Some(
                        LogContext::new("block_monitor", "process_block_shared")
                            .with_block_number(block_number)
                            .with_metadata("skipped_addresses", json!(addresses.len())),
                    ),
                );
                return 0;
            }
        };

        let mut matched = 0;
        for address in addresses {
            matched += self.record_matches(address, &transactions).await;
        }
        matched
    }

    // Store first, then notify; a transaction that could not be stored is not announced.
    async fn record_matches(&self, address: &str, transactions: &[Transaction]) -> usize {
        let mut matched = 0;

        for transaction in filter_for_address(transactions, address) {
            if let Err(e) = self.storage.save_transaction(address, transaction.clone()) {
                ErrorLogger::log_error(
                    &e.into(),
                    Some(LogContext::new("block_monitor", "save_transaction").with_address(address)),
                );
                continue;
            }

            MetricsLogger::log_transaction_matched(address, transaction);
            if let Err(e) = self.notifier.notify(address, transaction).await {
                ErrorLogger::log_error(
                    &e.into(),
                    Some(LogContext::new("block_monitor", "notify").with_address(address)),
                );
            }
            matched += 1;
        }

        matched
    }

    /// Poll until [`BlockMonitor::shutdown`] is called. An iteration already in
    /// progress runs to completion; the wait between iterations is interrupted.
    pub async fn start(&self) {
        info!(
            "Starting block monitor with {} second polling interval",
            self.config.poll_interval.as_secs()
        );

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            self.poll_once().await;

            tokio::select! {
                _ = sleep(self.config.poll_interval) => {}
                _ = shutdown_rx.changed() => {}
            }
        }

        info!("Block monitor stopped at block {}", self.current_block());
    }

    /// Request graceful shutdown
    pub fn shutdown(&self) {
        info!("Requesting graceful shutdown");
        self.shutdown_tx.send_replace(true);
    }

    fn subscribed_count(&self) -> usize {
        self.storage.subscribed_addresses().map(|a| a.len()).unwrap_or(0)
    }
}
