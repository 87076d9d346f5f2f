use axum::{
    extract::{rejection::JsonRejection, Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::blockchain::BlockMonitor;
use crate::error::{ParserError, ValidationError};
use crate::logging::{LogContext, PerformanceMonitor};
use crate::models::Transaction;

/// Request body for the subscribe endpoint
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub address: String,
}

impl SubscribeRequest {
    /// The address as sent, or a validation error when it is blank
    pub fn validated_address(&self) -> Result<&str, ValidationError> {
        if self.address.trim().is_empty() {
            return Err(ValidationError::EmptyAddress);
        }
        Ok(&self.address)
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response structure for the transactions endpoint
#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub address: String,
    pub transactions: Vec<Transaction>,
    pub total_count: usize,
}

#[derive(Debug, Serialize)]
pub struct CurrentBlockResponse {
    pub current_block: u64,
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<BlockMonitor>,
}

/// Build the API router around a shared monitor
pub fn router(monitor: Arc<BlockMonitor>) -> Router {
    Router::new()
        .route("/subscribe", post(subscribe))
        .route("/transactions/:address", get(get_transactions))
        .route("/current-block", get(get_current_block))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(log_request))
                .layer(CorsLayer::permissive()),
        )
        .with_state(AppState { monitor })
}

/// HTTP API server
pub struct ApiServer {
    monitor: Arc<BlockMonitor>,
    pub host: String,
    pub port: u16,
}

impl ApiServer {
    pub fn new(monitor: Arc<BlockMonitor>, host: String, port: u16) -> Self {
        Self { monitor, host, port }
    }

    /// Serve until `shutdown` resolves
    pub async fn start<F>(&self, shutdown: F) -> Result<(), ParserError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ParserError::Server(format!("Failed to bind to {}: {}", addr, e)))?;

        log::info!("HTTP API server starting on {}", addr);

        axum::serve(listener, router(self.monitor.clone()))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ParserError::Server(format!("Server error: {}", e)))?;

        Ok(())
    }
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let monitor = PerformanceMonitor::new("http_request");

    let response = next.run(request).await;

    LogContext::new("api", "request")
        .with_method(&method)
        .with_metadata("path", serde_json::json!(path))
        .with_metadata("status", serde_json::json!(response.status().as_u16()))
        .with_duration_ms(monitor.elapsed_ms())
        .debug(&format!("{} {} -> {}", method, path, response.status()));

    response
}

fn bad_request(error: ValidationError) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "invalid_request".to_string(),
            message: error.to_string(),
        }),
    )
}

/// POST /subscribe - Add an address to the watch list
pub async fn subscribe(
    State(state): State<AppState>,
    payload: Result<Json<SubscribeRequest>, JsonRejection>,
) -> ApiResult<MessageResponse> {
    let Json(request) = payload
        .map_err(|rejection| bad_request(ValidationError::MalformedBody(rejection.body_text())))?;
    let address = request.validated_address().map_err(bad_request)?;

    if !state.monitor.subscribe(address) {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "subscribe_failed".to_string(),
                message: "Failed to subscribe".to_string(),
            }),
        ));
    }

    Ok(Json(MessageResponse {
        message: "success".to_string(),
    }))
}

/// GET /transactions/:address - Recorded transactions for an address
pub async fn get_transactions(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Json<TransactionsResponse> {
    let transactions = state.monitor.get_transactions(&address);

    Json(TransactionsResponse {
        total_count: transactions.len(),
        address,
        transactions,
    })
}

/// GET /current-block - Last observed chain height
pub async fn get_current_block(State(state): State<AppState>) -> Json<CurrentBlockResponse> {
    Json(CurrentBlockResponse {
        current_block: state.monitor.current_block(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_request_validation() {
        let request = SubscribeRequest {
            address: "0xAbC123".to_string(),
        };
        assert_eq!(request.validated_address().unwrap(), "0xAbC123");

        let blank = SubscribeRequest {
            address: "   ".to_string(),
        };
        assert!(matches!(blank.validated_address(), Err(ValidationError::EmptyAddress)));
    }

    #[test]
    fn test_error_response_serialization() {
        let (status, Json(body)) = bad_request(ValidationError::EmptyAddress);
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "invalid_request");
        assert_eq!(json["message"], "address is required");
    }
}
