use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use eth_tx_parser::api::{router, ApiServer};
use eth_tx_parser::blockchain::{BlockMonitor, RpcGateway};
use eth_tx_parser::error::RpcError;
use eth_tx_parser::models::Transaction;
use eth_tx_parser::notification::LogNotifier;
use eth_tx_parser::storage::{MemoryStorage, Storage};

/// Node that answers every height request with the same block number
struct FixedHeightGateway(&'static str);

#[async_trait]
impl RpcGateway for FixedHeightGateway {
    async fn call(&self, method: &str, _params: Vec<Value>) -> Result<Vec<u8>, RpcError> {
        match method {
            "eth_blockNumber" => Ok(json!({"jsonrpc": "2.0", "id": 1, "result": self.0})
                .to_string()
                .into_bytes()),
            _ => Err(RpcError::Connection("not scripted".to_string())),
        }
    }
}

fn setup() -> (Router, Arc<BlockMonitor>, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let monitor = Arc::new(BlockMonitor::new(
        Arc::new(FixedHeightGateway("0x10d4f")),
        storage.clone(),
        Arc::new(LogNotifier::new()),
        None,
    ));
    (router(monitor.clone()), monitor, storage)
}

fn subscribe_request(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/subscribe")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_subscribe_success() {
    let (app, _monitor, storage) = setup();

    let response = app
        .oneshot(subscribe_request(r#"{"address":"0x123"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"message": "success"}));
    assert_eq!(storage.subscribed_addresses().unwrap(), vec!["0x123".to_string()]);
}

#[tokio::test]
async fn test_subscribe_twice_is_idempotent() {
    let (app, _monitor, storage) = setup();

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(subscribe_request(r#"{"address":"0x123"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(storage.subscribed_addresses().unwrap().len(), 1);
}

#[tokio::test]
async fn test_subscribe_keeps_address_case() {
    let (app, _monitor, storage) = setup();

    app.oneshot(subscribe_request(r#"{"address":"0xAbC"}"#))
        .await
        .unwrap();

    assert_eq!(storage.subscribed_addresses().unwrap(), vec!["0xAbC".to_string()]);
}

#[tokio::test]
async fn test_subscribe_rejects_bad_input() {
    let cases = [
        r#"{"address":""}"#,
        r#"{"address":"   "}"#,
        r#"{}"#,
        r#"{"address":42}"#,
        "not json",
    ];

    for body in cases {
        let (app, _monitor, storage) = setup();
        let response = app.oneshot(subscribe_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        let json = body_json(response).await;
        assert_eq!(json["error"], "invalid_request");
        assert!(json["message"].is_string());
        assert!(storage.subscribed_addresses().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_subscribe_requires_json_content_type() {
    let (app, _monitor, _storage) = setup();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/subscribe")
        .body(Body::from(r#"{"address":"0x123"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_transactions_for_unknown_address_is_empty() {
    let (app, _monitor, _storage) = setup();

    let response = app.oneshot(get("/transactions/0xnobody")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"address": "0xnobody", "transactions": [], "total_count": 0})
    );
}

#[tokio::test]
async fn test_transactions_returns_recorded_log() {
    let (app, _monitor, storage) = setup();
    let tx = Transaction {
        block_hash: "0xabc".to_string(),
        block_number: "0x10d4f".to_string(),
        from: "0x123".to_string(),
        to: "0x456".to_string(),
        value: "0x1".to_string(),
    };
    storage.subscribe_address("0x123").unwrap();
    storage.save_transaction("0x123", tx).unwrap();

    let response = app.oneshot(get("/transactions/0x123")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total_count"], 1);
    assert_eq!(
        json["transactions"][0],
        json!({
            "blockHash": "0xabc",
            "blockNumber": "0x10d4f",
            "from": "0x123",
            "to": "0x456",
            "value": "0x1"
        })
    );
}

#[tokio::test]
async fn test_current_block_tracks_monitor() {
    let (app, monitor, _storage) = setup();

    let response = app.clone().oneshot(get("/current-block")).await.unwrap();
    assert_eq!(body_json(response).await, json!({"current_block": 0}));

    monitor.poll_once().await;

    let response = app.oneshot(get("/current-block")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"current_block": 68943}));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (app, _monitor, _storage) = setup();

    let response = app.oneshot(get("/blocks")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_server_stops_on_shutdown() {
    let (_app, monitor, _storage) = setup();
    let server = ApiServer::new(monitor, "127.0.0.1".to_string(), 0);

    let result = tokio::time::timeout(std::time::Duration::from_secs(2), server.start(async {})).await;

    assert!(matches!(result, Ok(Ok(()))));
}

#[tokio::test]
async fn test_server_reports_bind_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let (_app, monitor, _storage) = setup();
    let server = ApiServer::new(monitor, "127.0.0.1".to_string(), port);

    let result = server.start(async {}).await;

    assert!(result.is_err());
}
