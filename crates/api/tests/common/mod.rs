#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;

use healthwatch_api::config::ServerConfig;
use healthwatch_api::router::build_app_router;
use healthwatch_api::state::AppState;
use healthwatch_core::access::AccessPolicy;
use healthwatch_core::health::RuleSet;
use healthwatch_core::rate_limit::CommandRateLimiter;
use healthwatch_core::types::DbId;
use healthwatch_db::SqliteStore;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

/// Build the application with an open access policy and no cool-down.
pub fn build_test_app(pool: SqlitePool) -> Router {
    build_test_app_with(pool, AccessPolicy::open(), Duration::ZERO)
}

/// Build the application with the given access policy and cool-down.
///
/// Uses the same router builder as `main.rs`, so tests exercise the
/// production middleware stack.
pub fn build_test_app_with(
    pool: SqlitePool,
    access: AccessPolicy,
    cooldown: Duration,
) -> Router {
    let config = test_config();
    let state = AppState {
        store: Arc::new(SqliteStore::new(pool.clone())),
        pool,
        config: Arc::new(config.clone()),
        rules: RuleSet::default(),
        access: Arc::new(access),
        rate_limiter: Arc::new(CommandRateLimiter::new(cooldown)),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

fn builder(method: Method, uri: &str, owner: Option<DbId>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match owner {
        Some(id) => builder.header("x-owner-id", id.to_string()),
        None => builder,
    }
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, builder(Method::GET, uri, None).body(Body::empty()).unwrap()).await
}

pub async fn get_as(app: Router, uri: &str, owner: DbId) -> Response {
    send(
        app,
        builder(Method::GET, uri, Some(owner))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    post_json_as_opt(app, uri, None, body).await
}

pub async fn post_json_as(
    app: Router,
    uri: &str,
    owner: DbId,
    body: serde_json::Value,
) -> Response {
    post_json_as_opt(app, uri, Some(owner), body).await
}

async fn post_json_as_opt(
    app: Router,
    uri: &str,
    owner: Option<DbId>,
    body: serde_json::Value,
) -> Response {
    let request = builder(Method::POST, uri, owner)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST a raw (possibly malformed) JSON body.
pub async fn post_raw(app: Router, uri: &str, body: &'static str) -> Response {
    let request = builder(Method::POST, uri, None)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn delete_as(app: Router, uri: &str, owner: DbId) -> Response {
    send(
        app,
        builder(Method::DELETE, uri, Some(owner))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
