//! HTTP surface tests over the in-memory store and mock host.

use std::sync::Arc;

use axum_test::TestServer;
use chrono::{TimeDelta, Utc};
use serde_json::{json, Value};
use uplink_api::routes::setup_routes;
use uplink_api::state::AppState;
use uplink_core::Config;
use uplink_host::test_helpers::MockVideoHost;
use uplink_store::test_helpers::MemoryStore;

struct TestApp {
    server: TestServer,
    state: Arc<AppState>,
    host: Arc<MockVideoHost>,
}

fn spawn_app(config: Config) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let host = Arc::new(MockVideoHost::new());
    let state = Arc::new(AppState::new(config.clone(), store, host.clone()));
    let app = setup_routes(&config, state.clone()).unwrap();
    TestApp {
        server: TestServer::new(app).unwrap(),
        state,
        host,
    }
}

#[tokio::test]
async fn initiate_returns_upload_destination() {
    let app = spawn_app(Config::default());

    let response = app
        .server
        .post("/api/v0/uploads")
        .json(&json!({ "size_bytes": 1048576, "display_name": "talk.mp4" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body["upload_link"].as_str().unwrap().starts_with("https://"));
    assert!(!body["media_id"].as_str().unwrap().is_empty());
    assert_eq!(body["token"].as_str().unwrap().len(), 64);
    assert_eq!(body["safety_net_registered"], json!(true));
}

#[tokio::test]
async fn initiate_rejects_non_positive_size() {
    let app = spawn_app(Config::default());

    let response = app
        .server
        .post("/api/v0/uploads")
        .json(&json!({ "size_bytes": 0 }))
        .await;
    response.assert_status_bad_request();

    let body: Value = response.json();
    assert_eq!(body["code"], json!("INVALID_INPUT"));
}

#[tokio::test]
async fn initiate_rejects_missing_size() {
    let app = spawn_app(Config::default());

    let response = app
        .server
        .post("/api/v0/uploads")
        .json(&json!({ "display_name": "no size" }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn confirm_unknown_token_is_a_data_outcome_not_an_error() {
    let app = spawn_app(Config::default());

    let response = app
        .server
        .post("/api/v0/uploads/confirm")
        .json(&json!({ "token": "ghost", "media_id": "med1" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["reason"], json!("NOT_FOUND"));
}

#[tokio::test]
async fn confirm_rejects_empty_fields() {
    let app = spawn_app(Config::default());

    let response = app
        .server
        .post("/api/v0/uploads/confirm")
        .json(&json!({ "token": "", "media_id": "med1" }))
        .await;
    response.assert_status_bad_request();

    let response = app
        .server
        .post("/api/v0/uploads/confirm")
        .json(&json!({ "token": "tok" }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn lifecycle_confirm_then_sweep_deletes_nothing() {
    let app = spawn_app(Config::default());

    let initiated: Value = app
        .server
        .post("/api/v0/uploads")
        .json(&json!({ "size_bytes": 2048 }))
        .await
        .json();
    let token = initiated["token"].as_str().unwrap();
    let media_id = initiated["media_id"].as_str().unwrap();

    let confirmed: Value = app
        .server
        .post("/api/v0/uploads/confirm")
        .json(&json!({ "token": token, "media_id": media_id }))
        .await
        .json();
    assert_eq!(confirmed["ok"], json!(true));

    let report: Value = app
        .server
        .post("/api/v0/uploads/sweep")
        .json(&json!({ "stale_minutes": 1 }))
        .await
        .json();
    assert_eq!(report["found"], json!(0));
    assert_eq!(report["deleted"], json!(0));
    assert!(app.host.delete_calls().is_empty());
}

#[tokio::test]
async fn sweep_reclaims_seeded_stale_records() {
    let app = spawn_app(Config::default());

    // Seed records old enough to be past the default staleness cutoff.
    let old = Utc::now() - TimeDelta::hours(4);
    app.state.repository.create("tok1", "med1", old).await.unwrap();
    app.state
        .repository
        .create("tok2", "med2", old + TimeDelta::minutes(1))
        .await
        .unwrap();

    let response = app
        .server
        .post("/api/v0/uploads/sweep")
        .json(&json!({ "stale_minutes": 120, "limit": 10 }))
        .await;
    response.assert_status_ok();

    let report: Value = response.json();
    assert_eq!(report["found"], json!(2));
    assert_eq!(report["deleted"], json!(2));
    assert_eq!(report["items"].as_array().unwrap().len(), 2);
    assert_eq!(report["items"][0]["outcome"], json!("deleted"));
    assert_eq!(
        app.host.delete_calls(),
        vec!["med1".to_string(), "med2".to_string()]
    );
}

#[tokio::test]
async fn sweep_accepts_legacy_hours_parameter() {
    let app = spawn_app(Config::default());

    let old = Utc::now() - TimeDelta::minutes(90);
    app.state.repository.create("tok", "med", old).await.unwrap();

    let report: Value = app
        .server
        .post("/api/v0/uploads/sweep")
        .json(&json!({ "stale_hours": 1 }))
        .await
        .json();
    assert_eq!(report["deleted"], json!(1));
}

#[tokio::test]
async fn sweep_rejects_non_positive_parameters() {
    let app = spawn_app(Config::default());

    let response = app
        .server
        .post("/api/v0/uploads/sweep")
        .json(&json!({ "stale_minutes": -5 }))
        .await;
    response.assert_status_bad_request();

    let response = app
        .server
        .post("/api/v0/uploads/sweep")
        .json(&json!({ "limit": 0 }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn sweep_rejects_out_of_range_staleness() {
    let app = spawn_app(Config::default());

    let response = app
        .server
        .post("/api/v0/uploads/sweep")
        .json(&json!({ "stale_minutes": i64::MAX }))
        .await;
    response.assert_status_bad_request();

    let body: Value = response.json();
    assert_eq!(body["code"], json!("INVALID_INPUT"));

    // The hours fallback saturates into the same range check.
    let response = app
        .server
        .post("/api/v0/uploads/sweep")
        .json(&json!({ "stale_hours": i64::MAX }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn sweep_reports_partial_failure_per_item() {
    let app = spawn_app(Config::default());

    let old = Utc::now() - TimeDelta::hours(4);
    app.state.repository.create("tok1", "med1", old).await.unwrap();
    app.state
        .repository
        .create("tok2", "med2", old + TimeDelta::minutes(1))
        .await
        .unwrap();
    app.host.fail_delete_for("med2");

    let report: Value = app
        .server
        .post("/api/v0/uploads/sweep")
        .json(&json!({ "stale_minutes": 120 }))
        .await
        .json();
    assert_eq!(report["found"], json!(2));
    assert_eq!(report["deleted"], json!(1));
    assert_eq!(report["items"][1]["outcome"], json!("delete_failed"));
    assert!(report["items"][1]["error"].is_string());
}

#[tokio::test]
async fn protected_routes_require_the_configured_api_key() {
    let app = spawn_app(Config::default().with_api_key("secret-key"));

    let response = app
        .server
        .post("/api/v0/uploads")
        .json(&json!({ "size_bytes": 1 }))
        .await;
    response.assert_status_unauthorized();

    let response = app
        .server
        .post("/api/v0/uploads")
        .add_header("x-api-key", "secret-key")
        .json(&json!({ "size_bytes": 1 }))
        .await;
    response.assert_status_ok();

    // Health stays public.
    let response = app.server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn readiness_reports_dependency_status() {
    let app = spawn_app(Config::default());

    let response = app.server.get("/health/ready").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], json!("ready"));
    assert_eq!(body["store"], json!("healthy"));
    assert_eq!(body["host"], json!("healthy"));
}
