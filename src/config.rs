use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use crate::error::ConfigError;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// RPC client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL of the node
    pub endpoint: String,
    /// Per-call timeout in seconds
    pub timeout_seconds: u64,
}

/// Block polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Delay between height checks in seconds
    pub poll_interval_seconds: u64,
    /// Fetch each new block once and filter it for every address
    pub shared_block_fetch: bool,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

/// Notification sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// When set, matched transactions are POSTed here instead of logged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    /// Webhook request timeout in seconds
    pub timeout_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://cloudflare-eth.com".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 10,
            shared_block_fetch: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_seconds: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables.
    /// Environment variables take precedence over file values.
    ///
    /// An explicitly named file must exist; the default (`$CONFIG_FILE` or
    /// `config.toml`) may be absent. The result is not validated, so callers
    /// can layer further overrides before calling [`AppConfig::validate`].
    pub fn load(explicit_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = match explicit_path {
            Some(path) => Self::read_file(path)?,
            None => {
                let path = env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
                Self::load_from_file(&path)?
            }
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults when it does not exist
    pub fn load_from_file(config_path: &str) -> Result<Self, ConfigError> {
        if !Path::new(config_path).exists() {
            return Ok(Self::default());
        }
        Self::read_file(config_path)
    }

    fn read_file(config_path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(config_path)
            .map_err(|_| ConfigError::FileNotFound(config_path.to_string()))?;
        toml::from_str(&content).map_err(|e| ConfigError::Parsing(e.to_string()))
    }

    /// Command-line values win over both file and environment
    pub fn apply_cli_overrides(&mut self, rpc_url: Option<String>, port: Option<u16>) {
        if let Some(rpc_url) = rpc_url {
            self.rpc.endpoint = rpc_url;
        }
        if let Some(port) = port {
            self.api.port = port;
        }
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(endpoint) = env::var("ETH_RPC_URL") {
            self.rpc.endpoint = endpoint;
        }
        if let Some(timeout) = parse_env("RPC_TIMEOUT_SECONDS")? {
            self.rpc.timeout_seconds = timeout;
        }

        if let Some(interval) = parse_env("POLL_INTERVAL_SECONDS")? {
            self.polling.poll_interval_seconds = interval;
        }
        if let Some(shared) = parse_env("SHARED_BLOCK_FETCH")? {
            self.polling.shared_block_fetch = shared;
        }

        if let Ok(host) = env::var("API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = parse_env("API_PORT")? {
            self.api.port = port;
        }

        if let Ok(url) = env::var("NOTIFICATION_WEBHOOK_URL") {
            self.notification.webhook_url = Some(url);
        }

        if let Ok(level) = env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = env::var("LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_http_url(&self.rpc.endpoint) {
            return Err(ConfigError::InvalidUrl(self.rpc.endpoint.clone()));
        }

        if self.rpc.timeout_seconds == 0 || self.rpc.timeout_seconds > 300 {
            return Err(invalid("rpc.timeout_seconds", self.rpc.timeout_seconds));
        }

        if self.polling.poll_interval_seconds == 0 || self.polling.poll_interval_seconds > 3600 {
            return Err(invalid("polling.poll_interval_seconds", self.polling.poll_interval_seconds));
        }

        if self.api.port == 0 {
            return Err(invalid("api.port", self.api.port));
        }

        if let Some(url) = &self.notification.webhook_url {
            if !is_http_url(url) {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        if self.notification.timeout_seconds == 0 {
            return Err(invalid("notification.timeout_seconds", self.notification.timeout_seconds));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(invalid("logging.level", &self.logging.level));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(invalid("logging.format", &self.logging.format));
        }

        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample_config() -> Result<String, ConfigError> {
        toml::to_string_pretty(&Self::default()).map_err(|e| ConfigError::Parsing(e.to_string()))
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key: key.to_string(), value }),
        Err(_) => Ok(None),
    }
}

fn invalid(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
