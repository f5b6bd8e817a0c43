//! End-to-end tests for the HTTP surface using an in-memory store.

use std::net::SocketAddr;
use std::sync::Arc;

use pagestats::config::PageKind;
use pagestats::http::{create_routes, AppState, ErrorResponse, HealthResponse, QrResponse};
use pagestats::stats::{CounterStore, StatsSnapshot, StorageType};
use reqwest::{Client, StatusCode};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    async fn spawn(store: CounterStore, page: PageKind) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let app = create_routes(AppState::new(Arc::new(store), page));
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("test server failed");
        });

        Self {
            addr,
            shutdown: Some(shutdown_tx),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

#[tokio::test]
async fn test_page_views_are_counted() {
    let server = TestServer::spawn(CounterStore::in_memory("qr_count_"), PageKind::Qr).await;
    let client = Client::new();

    for _ in 0..3 {
        let response = client.get(server.url("/")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["cache-control"].to_str().unwrap(),
            "no-cache"
        );
        assert!(response.text().await.unwrap().contains("QR Code Creator"));
    }

    let stats: StatsSnapshot = client
        .get(server.url("/api/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(stats.last_hour, 3);
    assert_eq!(stats.last_day, 3);
    assert_eq!(stats.last_week, 3);
    assert_eq!(stats.storage_type, StorageType::Memory);
}

#[tokio::test]
async fn test_stats_endpoint_does_not_count() {
    let server = TestServer::spawn(CounterStore::in_memory("qr_count_"), PageKind::Qr).await;
    let client = Client::new();

    let first: serde_json::Value = client
        .get(server.url("/api/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second: serde_json::Value = client
        .get(server.url("/api/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        first,
        serde_json::json!({
            "last_hour": 0,
            "last_day": 0,
            "last_week": 0,
            "storage_type": "memory"
        })
    );
}

#[tokio::test]
async fn test_cat_page() {
    let server = TestServer::spawn(CounterStore::in_memory("cat_count_"), PageKind::Cat).await;

    let body = reqwest::get(server.url("/")).await.unwrap().text().await.unwrap();
    assert!(body.contains("https://cataas.com/cat?t="));
}

#[tokio::test]
async fn test_health_reports_storage() {
    let server = TestServer::spawn(CounterStore::in_memory("qr_count_"), PageKind::Qr).await;

    let health: HealthResponse = reqwest::get(server.url("/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(health.status, "ok");
    assert_eq!(health.storage_type, StorageType::Memory);
}

#[tokio::test]
async fn test_qr_link_generation() {
    let server = TestServer::spawn(CounterStore::in_memory("qr_count_"), PageKind::Qr).await;

    let response = Client::new()
        .post(server.url("/api/qr"))
        .json(&serde_json::json!({
            "url": "example.com",
            "size": 320,
            "ecc": "Q",
            "color": [255, 255, 255],
            "bgcolor": [31, 41, 55]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: QrResponse = response.json().await.unwrap();
    assert_eq!(body.target, "https://example.com");
    assert!(body.image_url.contains("size=320x320"));
    assert!(body.image_url.contains("ecc=Q"));
    assert!(body.image_url.contains("color=255-255-255"));
    assert!(body.image_url.contains("bgcolor=31-41-55"));
}

#[tokio::test]
async fn test_qr_missing_body_is_client_error() {
    let server = TestServer::spawn(CounterStore::in_memory("qr_count_"), PageKind::Qr).await;

    let response = Client::new().post(server.url("/api/qr")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.error, "BadRequest");
}

#[tokio::test]
async fn test_qr_malformed_body_is_client_error() {
    let server = TestServer::spawn(CounterStore::in_memory("qr_count_"), PageKind::Qr).await;
    let client = Client::new();

    let response = client
        .post(server.url("/api/qr"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(server.url("/api/qr"))
        .json(&serde_json::json!({"size": 256}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(server.url("/api/qr"))
        .json(&serde_json::json!({"url": "example.com", "size": 5000}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = response.json().await.unwrap();
    assert!(body.message.contains("5000"));
}
