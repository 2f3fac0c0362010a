//! Admin API: read-only diagnostics behind a bearer token.

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use std::time::Instant;

use crate::config::GatewayConfig;
use crate::correlation::Coordinator;
use self::auth::admin_auth_middleware;
use self::handlers::*;

/// State shared by admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub coordinator: Arc<Coordinator>,
    pub api_key: Arc<str>,
    pub downstream: Arc<str>,
    pub started_at: Instant,
}

impl AdminState {
    pub fn new(coordinator: Arc<Coordinator>, config: &GatewayConfig) -> Self {
        let downstream = config
            .downstream
            .endpoint()
            .map(|u| u.to_string())
            .unwrap_or_else(|_| config.downstream.base_url.clone());
        Self {
            coordinator,
            api_key: Arc::from(config.admin.api_key.as_str()),
            downstream: Arc::from(downstream),
            started_at: Instant::now(),
        }
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/pending", get(get_pending))
        .route("/admin/config", get(get_config))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation::{ConversationId, HttpForwarder, Registry};
    use axum::{body::Body, http::{Request, StatusCode}};
    use std::time::Duration;
    use tower::ServiceExt;

    fn state() -> AdminState {
        let mut config = GatewayConfig::default();
        config.admin.enabled = true;
        config.admin.api_key = "secret".into();
        let forwarder = Arc::new(HttpForwarder::new(&config.downstream).unwrap());
        let coordinator = Arc::new(Coordinator::new(
            Arc::new(Registry::new()),
            forwarder,
            Duration::from_secs(300),
        ));
        AdminState::new(coordinator, &config)
    }

    fn get(path: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(path);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_requires_token() {
        let router = setup_admin_router(state());
        let res = router.clone().oneshot(get("/admin/status", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = router.oneshot(get("/admin/status", Some("wrong"))).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_pending_count() {
        let state = state();
        let _handle = state
            .coordinator
            .registry()
            .try_register(ConversationId::new("conv-1").unwrap())
            .unwrap();

        let res = setup_admin_router(state)
            .oneshot(get("/admin/pending", Some("secret")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["in_flight"], 1);
    }
}
