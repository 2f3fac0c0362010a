//! Shared utilities for integration tests.

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use callback_gateway::config::GatewayConfig;
use callback_gateway::correlation::{ConversationId, Registry};
use callback_gateway::http::HttpServer;
use callback_gateway::lifecycle::Shutdown;

/// A request received by the mock downstream.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Captured {
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    captured: Arc<Mutex<Vec<Captured>>>,
}

/// Mock downstream answering every forward with `status`.
pub struct MockDownstream {
    pub addr: SocketAddr,
    captured: Arc<Mutex<Vec<Captured>>>,
}

impl MockDownstream {
    pub async fn start(status: StatusCode) -> Self {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            status,
            captured: captured.clone(),
        };
        let app = Router::new()
            .route("/api/v1/messages/", post(record))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, captured }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    #[allow(dead_code)]
    pub fn captured(&self) -> Vec<Captured> {
        self.captured.lock().unwrap().clone()
    }
}

async fn record(
    State(state): State<MockState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let body = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    state.captured.lock().unwrap().push(Captured { query, headers, body });
    state.status
}

/// A running gateway bound to an ephemeral port.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub registry: Arc<Registry>,
    pub shutdown: Shutdown,
    #[allow(dead_code)]
    pub config_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Wait until a waiter for `id` is registered.
    pub async fn wait_registered(&self, id: &str) {
        let id = ConversationId::new(id).unwrap();
        wait_until(|| self.registry.contains(&id)).await;
    }

    /// Wait until no waiter for `id` is registered.
    #[allow(dead_code)]
    pub async fn wait_released(&self, id: &str) {
        let id = ConversationId::new(id).unwrap();
        wait_until(|| !self.registry.contains(&id)).await;
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Gateway config pointing at `downstream`, with a short timeout.
pub fn gateway_config(downstream: &MockDownstream, timeout_secs: u64) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.downstream.base_url = downstream.base_url();
    config.downstream.request_timeout_secs = 5;
    config.correlation.timeout_secs = timeout_secs;
    config
}

pub async fn start_gateway(config: GatewayConfig) -> TestGateway {
    let shutdown = Shutdown::new();
    let (config_tx, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config).unwrap();
    let registry = server.registry();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    TestGateway {
        addr,
        registry,
        shutdown,
        config_tx,
    }
}

/// Poll `condition` every 10ms for up to 5 seconds.
pub async fn wait_until<F: Fn() -> bool>(condition: F) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(tokio::time::Instant::now() < deadline, "condition not met within 5s");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
