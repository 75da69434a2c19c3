//! Integration tests for the `/api/v1/alerts` endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, delete, get, post_json, put_json};
use serde_json::json;
use sqlx::PgPool;

fn alert_body(title: &str) -> serde_json::Value {
    json!({
        "region": "DKI Jakarta",
        "level": "warning",
        "title": title,
        "message": "Ciliwung water level at Katulampa is rising",
        "source": "BPBD DKI",
    })
}

// ---------------------------------------------------------------------------
// Test: create, fetch, update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn create_and_update_alert(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(app.clone(), "/api/v1/alerts", alert_body("Siaga 3")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_active"], true);
    let id = json["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/alerts/{id}");

    let updated = put_json(app.clone(), &uri, json!({"level": "emergency"})).await;
    assert_eq!(updated.status(), StatusCode::OK);
    assert_eq!(body_json(updated).await["data"]["level"], "emergency");

    let fetched = body_json(get(app, &uri).await).await;
    assert_eq!(fetched["data"]["title"], "Siaga 3");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_alert_rejects_bad_input(pool: PgPool) {
    let app = build_test_app(pool);

    let mut body = alert_body("Siaga 2");
    body["level"] = json!("panic");
    let response = post_json(app.clone(), "/api/v1/alerts", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut body = alert_body("Siaga 2");
    body["issued_at"] = json!("2024-01-15T06:00:00Z");
    body["expires_at"] = json!("2024-01-15T05:00:00Z");
    let response = post_json(app, "/api/v1/alerts", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Test: deactivation hides the alert from the active list
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn deactivate_alert_is_idempotent(pool: PgPool) {
    let app = build_test_app(pool);

    let keep = body_json(post_json(app.clone(), "/api/v1/alerts", alert_body("Keep")).await).await;
    let gone = body_json(post_json(app.clone(), "/api/v1/alerts", alert_body("Gone")).await).await;
    let gone_id = gone["data"]["id"].as_i64().unwrap();
    let deactivate = format!("/api/v1/alerts/{gone_id}/deactivate");

    for _ in 0..2 {
        let response = post_json(app.clone(), &deactivate, json!({})).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["is_active"], false);
    }

    let active = body_json(get(app.clone(), "/api/v1/alerts?active_only=true").await).await;
    let active = active["data"].as_array().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["id"], keep["data"]["id"]);

    let all = body_json(get(app, "/api/v1/alerts").await).await;
    assert_eq!(all["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_alert_returns_404(pool: PgPool) {
    let app = build_test_app(pool);

    assert_eq!(
        post_json(app.clone(), "/api/v1/alerts/9999/deactivate", json!({})).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        delete(app, "/api/v1/alerts/9999").await.status(),
        StatusCode::NOT_FOUND
    );
}
