use thiserror::Error;

/// Main error type for the transaction parser
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Server error: {0}")]
    Server(String),
}

/// Transport failures reaching the node
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status: {code}")]
    Status { code: u16 },

    #[error("Timeout after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Connection failed: {0}")]
    Connection(String),
}

/// Malformed or unexpected JSON-RPC payloads
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing field in response: {0}")]
    MissingField(&'static str),

    #[error("Invalid hex quantity: {0}")]
    InvalidHex(String),

    #[error("Block not found")]
    BlockNotFound,

    #[error("RPC method error: code={code}, message={message}")]
    Rpc { code: i64, message: String },
}

/// Input rejected at the HTTP boundary
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("address is required")]
    EmptyAddress,

    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

/// Subscription and transaction log failures
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Lock acquisition failed: {0}")]
    Lock(String),
}

/// Notification sink failures
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Webhook responded with status {code}")]
    Status { code: u16 },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Configuration parsing failed: {0}")]
    Parsing(String),

    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ParserError>;

/// Error severity levels for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Startup cannot continue
    Critical,
    /// A whole poll iteration was lost
    High,
    /// A single fetch or delivery was lost
    Medium,
    /// Caller mistakes, mostly informational
    Low,
}

impl ParserError {
    /// Get the severity level of an error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ParserError::Config(_) => ErrorSeverity::Critical,
            ParserError::Server(_) => ErrorSeverity::Critical,

            ParserError::Rpc(RpcError::Connection(_)) => ErrorSeverity::High,
            ParserError::Storage(_) => ErrorSeverity::High,

            ParserError::Rpc(_) => ErrorSeverity::Medium,
            ParserError::Decode(DecodeError::BlockNotFound) => ErrorSeverity::Low,
            ParserError::Decode(_) => ErrorSeverity::Medium,
            ParserError::Notification(_) => ErrorSeverity::Medium,

            ParserError::Validation(_) => ErrorSeverity::Low,
        }
    }

    /// Whether the next poll iteration can be expected to get past this error
    pub fn is_recoverable(&self) -> bool {
        match self {
            ParserError::Rpc(_) => true,
            ParserError::Decode(_) => true,
            ParserError::Notification(_) => true,

            ParserError::Storage(_) => false,
            ParserError::Config(_) => false,
            ParserError::Validation(_) => false,
            ParserError::Server(_) => false,
        }
    }

    /// Short machine-readable code used in structured logs
    pub fn code(&self) -> &'static str {
        match self {
            ParserError::Rpc(RpcError::Timeout { .. }) => "rpc_timeout",
            ParserError::Rpc(_) => "rpc_error",
            ParserError::Decode(_) => "decode_error",
            ParserError::Storage(_) => "storage_error",
            ParserError::Notification(_) => "notification_error",
            ParserError::Config(_) => "config_error",
            ParserError::Validation(_) => "validation_error",
            ParserError::Server(_) => "server_error",
        }
    }
}
