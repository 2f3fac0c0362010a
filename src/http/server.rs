//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the submit, callback, and health handlers
//! - Wire up middleware (tracing, body limit, request ID)
//! - Own the correlation registry and coordinator
//! - Apply hot-reloaded correlation timeouts
//! - Serve until the shutdown signal fires

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::admin::AdminState;
use crate::config::GatewayConfig;
use crate::correlation::{Coordinator, ForwardError, Forwarder, HttpForwarder, Registry};
use crate::http::messages::submit_message;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::webhook::receive_callback;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
    pub registry: Arc<Registry>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    coordinator: Arc<Coordinator>,
}

impl HttpServer {
    /// Create a server forwarding to the configured downstream over HTTP.
    pub fn new(config: GatewayConfig) -> Result<Self, ForwardError> {
        let forwarder = Arc::new(HttpForwarder::new(&config.downstream)?);
        Ok(Self::with_forwarder(config, forwarder))
    }

    /// Create a server with a custom forwarder.
    pub fn with_forwarder(config: GatewayConfig, forwarder: Arc<dyn Forwarder>) -> Self {
        let registry = Arc::new(Registry::new());
        let coordinator = Arc::new(Coordinator::new(
            registry.clone(),
            forwarder,
            config.correlation.timeout(),
        ));

        let state = AppState {
            coordinator: coordinator.clone(),
            registry,
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            coordinator,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/messages", post(submit_message))
            .route("/webhook", post(receive_callback))
            .route("/health", get(health))
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TraceLayer::new_for_http())
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configs received on `config_updates` change the callback timeout for
    /// requests submitted afterwards. In-flight requests keep their timeout.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            timeout_secs = self.config.correlation.timeout_secs,
            "HTTP server starting"
        );

        let coordinator = self.coordinator.clone();
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                let timeout = config.correlation.timeout();
                if timeout != coordinator.timeout() {
                    tracing::info!(timeout = ?timeout, "Applying new callback timeout");
                    coordinator.set_timeout(timeout);
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reloader.abort();
        tracing::info!(
            in_flight = self.coordinator.registry().in_flight(),
            "HTTP server stopped"
        );
        Ok(())
    }

    /// Registry of in-flight requests.
    pub fn registry(&self) -> Arc<Registry> {
        self.coordinator.registry().clone()
    }

    /// State for the admin API.
    pub fn admin_state(&self) -> AdminState {
        AdminState::new(self.coordinator.clone(), &self.config)
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
