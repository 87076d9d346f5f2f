pub mod blockchain;
pub mod storage;
pub mod models;
pub mod notification;
pub mod api;
pub mod error;
pub mod logging;
pub mod config;

pub use blockchain::{BlockMonitor, BlockMonitorConfig, PollOutcome, RpcClient, RpcGateway};
pub use error::{ParserError, Result};
pub use logging::{LogContext, PerformanceMonitor, ErrorLogger, MetricsLogger};
pub use models::{Address, Transaction};
pub use notification::{LogNotifier, Notifier, WebhookNotifier};
pub use storage::{MemoryStorage, Storage};
pub use config::{AppConfig, RpcConfig, PollingConfig, ApiConfig, NotificationConfig, LoggingConfig};
