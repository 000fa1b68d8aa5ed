//! Shared integration-test harness.
//!
//! Builds the application through [`boardstorm_api::router::build_app_router`]
//! so tests exercise the exact production middleware stack, and provides
//! request helpers that speak to the router in-process via `tower::ServiceExt`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use sqlx::PgPool;
use tower::ServiceExt;

use boardstorm_api::auth::jwt::{self, JwtConfig};
use boardstorm_api::config::{ClusterConfig, PlanLimits, ServerConfig};
use boardstorm_api::router::build_app_router;
use boardstorm_api::state::AppState;
use boardstorm_api::ws::WsManager;
use boardstorm_cluster::{ClusterClient, ClusterSettings};
use boardstorm_core::types::FacilitatorId;

/// Build a test `ServerConfig` with safe defaults.
///
/// Plan limits are set deliberately small (3 workshops, 5 participants)
/// so capacity tests stay cheap.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        ws_heartbeat_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 60,
        },
        limits: PlanLimits {
            max_participants_per_workshop: 5,
            max_workshops_per_facilitator: 3,
        },
        cluster: ClusterConfig {
            // Unroutable on purpose; no test may reach a real model.
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: String::new(),
            model: "test-model".to_string(),
            timeout_secs: 1,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool and the test configuration.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ws_manager: Arc::new(WsManager::new()),
        event_bus: Arc::new(boardstorm_events::EventBus::default()),
        cluster: Arc::new(ClusterClient::new(ClusterSettings {
            base_url: config.cluster.base_url.clone(),
            api_key: config.cluster.api_key.clone(),
            model: config.cluster.model.clone(),
            timeout_secs: config.cluster.timeout_secs,
        })),
    };
    build_app_router(state, &config)
}

/// Mint a facilitator access token with the test JWT secret.
pub fn facilitator_token(facilitator_id: FacilitatorId) -> String {
    jwt::generate_token(facilitator_id, &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None, None).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
