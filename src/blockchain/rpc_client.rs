use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::error::RpcError;
use crate::logging::{LogContext, MetricsLogger, PerformanceMonitor};

/// Executes a named JSON-RPC method against the node and hands back the raw
/// response body. Implementations do not retry.
#[async_trait]
pub trait RpcGateway: Send + Sync {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Vec<u8>, RpcError>;
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Vec<Value>,
    id: u64,
}

impl<'a> JsonRpcRequest<'a> {
    fn new(method: &'a str, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
        }
    }
}

/// HTTP JSON-RPC client with a bounded per-call timeout
#[derive(Clone)]
pub struct RpcClient {
    client: Client,
    endpoint: String,
    timeout_seconds: u64,
}

impl RpcClient {
    pub fn new(endpoint: String, timeout_seconds: u64) -> Result<Self, RpcError> {
        let context = LogContext::new("rpc_client", "initialization")
            .with_metadata("endpoint", serde_json::json!(endpoint))
            .with_metadata("timeout_seconds", serde_json::json!(timeout_seconds));
        context.info("Initializing RPC client");

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            timeout_seconds,
        })
    }

    async fn send(&self, method: &str, params: Vec<Value>) -> Result<Vec<u8>, RpcError> {
        let request = JsonRpcRequest::new(method, params);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Status { code: status.as_u16() });
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        Ok(body.to_vec())
    }

    fn classify(&self, error: reqwest::Error) -> RpcError {
        if error.is_timeout() {
            RpcError::Timeout { seconds: self.timeout_seconds }
        } else if error.is_connect() {
            RpcError::Connection(error.to_string())
        } else {
            RpcError::Http(error)
        }
    }
}

#[async_trait]
impl RpcGateway for RpcClient {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Vec<u8>, RpcError> {
        LogContext::new("rpc_client", "call")
            .with_method(method)
            .trace(&format!("Sending RPC request: {}", method));

        let monitor = PerformanceMonitor::new(&format!("rpc_{}", method));
        let result = self.send(method, params).await;
        let duration = monitor.finish_with_result(&result);

        MetricsLogger::log_rpc_call(method, duration, result.is_ok());
        result
    }
}
