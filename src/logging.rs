use log::{debug, error, info, trace, warn, LevelFilter};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::config::LoggingConfig;
use crate::error::{ErrorSeverity, ParserError};
use crate::models::Transaction;

/// Structured logging context for the parser
pub struct LogContext {
    pub component: String,
    pub operation: String,
    pub metadata: HashMap<String, Value>,
}

impl LogContext {
    pub fn new(component: &str, operation: &str) -> Self {
        Self {
            component: component.to_string(),
            operation: operation.to_string(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    pub fn with_block_number(self, block_number: u64) -> Self {
        self.with_metadata("block_number", json!(block_number))
    }

    pub fn with_address(self, address: &str) -> Self {
        self.with_metadata("address", json!(address))
    }

    pub fn with_method(self, method: &str) -> Self {
        self.with_metadata("method", json!(method))
    }

    pub fn with_duration_ms(self, duration_ms: u64) -> Self {
        self.with_metadata("duration_ms", json!(duration_ms))
    }

    pub fn with_error(self, error: &dyn std::fmt::Display) -> Self {
        self.with_metadata("error", json!(error.to_string()))
    }

    fn format_message(&self, level: &str, message: &str) -> String {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let mut log_entry = json!({
            "timestamp": timestamp,
            "level": level,
            "component": self.component,
            "operation": self.operation,
            "message": message,
        });

        for (key, value) in &self.metadata {
            log_entry[key] = value.clone();
        }

        log_entry.to_string()
    }

    pub fn info(&self, message: &str) {
        info!("{}", self.format_message("INFO", message));
    }

    pub fn warn(&self, message: &str) {
        warn!("{}", self.format_message("WARN", message));
    }

    pub fn error(&self, message: &str) {
        error!("{}", self.format_message("ERROR", message));
    }

    pub fn debug(&self, message: &str) {
        debug!("{}", self.format_message("DEBUG", message));
    }

    pub fn trace(&self, message: &str) {
        trace!("{}", self.format_message("TRACE", message));
    }
}

/// Times an operation and logs its outcome
pub struct PerformanceMonitor {
    start_time: Instant,
    operation: String,
}

impl PerformanceMonitor {
    pub fn new(operation: &str) -> Self {
        Self {
            start_time: Instant::now(),
            operation: operation.to_string(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    pub fn finish_with_result<T, E>(self, result: &Result<T, E>) -> u64
    where
        E: std::fmt::Display,
    {
        let duration = self.elapsed_ms();

        let context = LogContext::new("performance", &self.operation).with_duration_ms(duration);

        match result {
            Ok(_) => context.trace(&format!("Operation completed in {}ms", duration)),
            Err(e) => context
                .with_error(e)
                .debug(&format!("Operation failed after {}ms", duration)),
        }

        duration
    }
}

/// Severity-aware error logging
pub struct ErrorLogger;

impl ErrorLogger {
    pub fn log_error(error: &ParserError, context: Option<LogContext>) {
        let severity = error.severity();

        let log_context = context
            .unwrap_or_else(|| LogContext::new("error", "unknown"))
            .with_metadata("error_code", json!(error.code()))
            .with_metadata("severity", json!(format!("{:?}", severity)))
            .with_metadata("recoverable", json!(error.is_recoverable()));

        let message = format!("Error occurred: {}", error);

        match severity {
            ErrorSeverity::Critical | ErrorSeverity::High => log_context.error(&message),
            ErrorSeverity::Medium => log_context.warn(&message),
            ErrorSeverity::Low => log_context.info(&message),
        }
    }
}

/// Operational metrics emitted as structured log lines
pub struct MetricsLogger;

impl MetricsLogger {
    pub fn log_rpc_call(method: &str, duration_ms: u64, success: bool) {
        let context = LogContext::new("metrics", "rpc_call")
            .with_method(method)
            .with_duration_ms(duration_ms)
            .with_metadata("success", json!(success));

        if success {
            context.debug(&format!("RPC call {} completed in {}ms", method, duration_ms));
        } else {
            context.warn(&format!("RPC call {} failed after {}ms", method, duration_ms));
        }
    }

    pub fn log_new_block(previous: u64, current: u64, subscribed_addresses: usize) {
        let context = LogContext::new("metrics", "new_block")
            .with_block_number(current)
            .with_metadata("previous_block", json!(previous))
            .with_metadata("subscribed_addresses", json!(subscribed_addresses));

        context.info(&format!("New block detected: {}", current));
    }

    pub fn log_transaction_matched(address: &str, transaction: &Transaction) {
        let context = LogContext::new("metrics", "transaction_matched")
            .with_address(address)
            .with_metadata("block_number", json!(transaction.block_number))
            .with_metadata("from", json!(transaction.from))
            .with_metadata("to", json!(transaction.to));

        context.debug(&format!("Matched transaction in block {}", transaction.block_number));
    }

    pub fn log_poll_iteration(block_number: u64, matched: usize, duration_ms: u64) {
        let context = LogContext::new("metrics", "poll_iteration")
            .with_block_number(block_number)
            .with_metadata("matched_transactions", json!(matched))
            .with_duration_ms(duration_ms);

        context.info(&format!("Block {} processed with {} matched transactions", block_number, matched));
    }
}

/// Initialize logging for the application. `RUST_LOG` still wins over the configured level.
pub fn init_logging(config: &LoggingConfig) -> Result<(), log::SetLoggerError> {
    let level = config.level.parse().unwrap_or(LevelFilter::Info);
    let json_format = config.format == "json";

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(move |buf, record| {
            use std::io::Write;

            let args = record.args().to_string();
            match serde_json::from_str::<Value>(&args) {
                Ok(json_value) if json_format => writeln!(buf, "{}", json_value),
                Ok(json_value) => writeln!(buf, "{}", serde_json::to_string_pretty(&json_value)?),
                Err(_) => writeln!(
                    buf,
                    "{} [{}] {}: {}",
                    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                    record.level(),
                    record.target(),
                    args
                ),
            }
        })
        .try_init()?;

    info!("Structured logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DecodeError, RpcError};

    #[test]
    fn test_log_context_creation() {
        let context = LogContext::new("block_monitor", "poll");
        assert_eq!(context.component, "block_monitor");
        assert_eq!(context.operation, "poll");
        assert!(context.metadata.is_empty());
    }

    #[test]
    fn test_log_context_with_metadata() {
        let context = LogContext::new("test", "test")
            .with_block_number(68943)
            .with_address("0x123")
            .with_method("eth_blockNumber");

        assert_eq!(context.metadata.get("block_number"), Some(&json!(68943)));
        assert_eq!(context.metadata.get("address"), Some(&json!("0x123")));
        assert_eq!(context.metadata.get("method"), Some(&json!("eth_blockNumber")));
    }

    #[test]
    fn test_log_context_format_message() {
        let context = LogContext::new("test", "test").with_metadata("key", json!("value"));

        let message = context.format_message("INFO", "test message");

        let parsed: Value = serde_json::from_str(&message).expect("Should be valid JSON");
        assert_eq!(parsed["level"], "INFO");
        assert_eq!(parsed["component"], "test");
        assert_eq!(parsed["message"], "test message");
        assert_eq!(parsed["key"], "value");
    }

    #[test]
    fn test_performance_monitor_with_result() {
        let monitor = PerformanceMonitor::new("rpc_eth_blockNumber");
        assert_eq!(monitor.operation, "rpc_eth_blockNumber");

        let result: Result<(), String> = Err("boom".to_string());
        let duration = monitor.finish_with_result(&result);
        assert!(duration < 1_000);
    }

    #[test]
    fn test_error_and_metrics_logging() {
        // These should not panic without a logger installed
        ErrorLogger::log_error(&ParserError::Rpc(RpcError::Timeout { seconds: 30 }), None);
        ErrorLogger::log_error(
            &ParserError::Decode(DecodeError::BlockNotFound),
            Some(LogContext::new("test", "error_test")),
        );

        let tx = Transaction {
            block_hash: "0xabc".to_string(),
            block_number: "0x10d4f".to_string(),
            from: "0x123".to_string(),
            to: String::new(),
            value: "0x10".to_string(),
        };
        MetricsLogger::log_rpc_call("eth_getBlockByNumber", 25, true);
        MetricsLogger::log_new_block(68942, 68943, 2);
        MetricsLogger::log_transaction_matched("0x123", &tx);
        MetricsLogger::log_poll_iteration(68943, 1, 40);
    }
}
