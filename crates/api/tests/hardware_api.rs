//! Integration tests for hardware inventory reports.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json};
use serde_json::json;
use sqlx::SqlitePool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn report_is_upserted_by_hostname(pool: SqlitePool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/hardware/report",
        json!({
            "hostname": "node-a",
            "kernel": "6.8.0",
            "cpu": "EPYC 7543",
            "disk": [{"name": "nvme0n1", "size": "1T"}],
            "network": {"eth0": "10.0.0.5"}
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let stored = body_json(response).await;
    assert_eq!(stored["data"]["kernel"], "6.8.0");
    assert_eq!(stored["data"]["disk"][0]["size"], "1T");

    let app = common::build_test_app(pool.clone());
    post_json(
        app,
        "/api/v1/hardware/report",
        json!({"hostname": "node-a", "kernel": "6.9.1"}),
    )
    .await;

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/hardware/list").await).await;
    let reports = json["data"].as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["kernel"], "6.9.1");
    // Fields missing from the latest report are reset.
    assert_eq!(reports[0]["cpu"], "");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn report_without_hostname_is_rejected(pool: SqlitePool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/hardware/report", json!({"hostname": ""})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/hardware/list").await).await;
    assert_eq!(json["data"], json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn inventory_does_not_affect_health(pool: SqlitePool) {
    let app = common::build_test_app(pool.clone());
    post_json(
        app,
        "/api/v1/hardware/report",
        json!({"hostname": "node-a", "memory": "512Gi"}),
    )
    .await;

    let app = common::build_test_app(pool);
    assert_eq!(get(app, "/healthcheck").await.status(), StatusCode::OK);
}
