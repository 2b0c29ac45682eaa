use std::sync::Arc;

use axum::http::StatusCode;
use http_body_util::BodyExt;
use remedy_core::audit::{AuditDb, MemoryAuditLog};
use remedy_core::registry::ActionRegistry;
use remedy_core::Executor;
use remedy_server::state::AppState;
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn memory_app() -> axum::Router {
    let exec = Executor::new(ActionRegistry::builtin(), Arc::new(MemoryAuditLog::new()));
    remedy_server::build_router(AppState::new(exec))
}

/// Send a GET request via `oneshot` and return (status, parsed JSON body).
async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a POST request with a JSON body via `oneshot` and return (status, parsed JSON body).
async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn execute(app: &axum::Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    post_json(app.clone(), "/api/actions/execute", body).await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_allowlist_size() {
    let (status, json) = get(memory_app(), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["actions"], 6);
}

#[tokio::test]
async fn list_actions_returns_allowlist() {
    let (status, json) = get(memory_app(), "/api/actions").await;
    assert_eq!(status, StatusCode::OK);
    let actions = json.as_array().unwrap();
    assert_eq!(actions.len(), 6);
    let scale = actions
        .iter()
        .find(|a| a["name"] == "scale_pods")
        .expect("scale_pods listed");
    assert_eq!(scale["required_params"], json!(["service", "replicas"]));
    assert!(scale["description"].is_string());
}

#[tokio::test]
async fn execute_valid_scale_returns_success() {
    let app = memory_app();
    let (status, json) = execute(
        &app,
        json!({
            "action": "scale_pods",
            "params": { "service": "payment-service", "replicas": 5 },
            "reason": "p99 latency above SLO",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    assert_eq!(json["result"]["new_replicas"], 5);
    assert!(json["execution_id"].is_string());
    assert!(json["duration_ms"].is_u64());

    let (status, history) = get(app, "/api/history?status=success").await;
    assert_eq!(status, StatusCode::OK);
    let records = history.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["action"], "scale_pods");
    assert_eq!(records[0]["id"], json["execution_id"]);
    assert_eq!(records[0]["reason"], "p99 latency above SLO");
}

#[tokio::test]
async fn execute_unknown_action_is_forbidden_and_audited() {
    let app = memory_app();
    let (status, json) = execute(
        &app,
        json!({ "action": "delete_namespace", "params": { "name": "prod" } }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "delete_namespace not permitted");
    assert_eq!(json["reason"], "not_permitted");
    assert_eq!(json["allowed_actions"].as_array().unwrap().len(), 6);

    let (_, history) = get(app, "/api/history?status=rejected").await;
    let records = history.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["action"], "delete_namespace");
    assert_eq!(records[0]["id"], json["execution_id"]);
}

#[tokio::test]
async fn execute_missing_param_is_bad_request_and_not_audited() {
    let app = memory_app();
    let (status, json) = execute(
        &app,
        json!({ "action": "scale_pods", "params": { "service": "api" } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["reason"], "invalid_params");
    assert_eq!(json["errors"][0], "missing required parameter 'replicas'");

    let (_, history) = get(app, "/api/history").await;
    assert!(history.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn execute_out_of_range_replicas_lists_errors() {
    let app = memory_app();
    let (status, json) = execute(
        &app,
        json!({ "action": "scale_pods", "params": { "service": "api", "replicas": 40 } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = json["errors"].as_array().unwrap();
    assert!(errors
        .iter()
        .any(|e| e.as_str().unwrap().contains("1 and 20")));
}

#[tokio::test]
async fn execute_without_params_field_defaults_to_empty() {
    let app = memory_app();
    let (status, json) = execute(&app, json!({ "action": "restart_service" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["errors"][0], "missing required parameter 'service'");
}

#[tokio::test]
async fn history_is_newest_first_and_stable() {
    let app = memory_app();
    for service in ["alpha", "bravo", "charlie"] {
        let (status, _) = execute(
            &app,
            json!({ "action": "restart_service", "params": { "service": service } }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, first) = get(app.clone(), "/api/history?limit=5").await;
    let services: Vec<_> = first
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["params"]["service"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(services, vec!["charlie", "bravo", "alpha"]);

    let (_, second) = get(app, "/api/history?limit=5").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn history_limit_is_applied() {
    let app = memory_app();
    for _ in 0..4 {
        execute(
            &app,
            json!({ "action": "clear_cache", "params": { "service": "api" } }),
        )
        .await;
    }
    let (_, json) = get(app, "/api/history?limit=2").await;
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn history_with_bogus_status_is_bad_request() {
    let (status, json) = get(memory_app(), "/api/history?status=bogus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["reason"], "invalid_filter");
}

#[tokio::test]
async fn history_with_malformed_limit_is_bad_request() {
    for uri in ["/api/history?limit=abc", "/api/history?limit=-3"] {
        let (status, json) = get(memory_app(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json["reason"], "invalid_filter", "{uri}");
    }
}

#[tokio::test]
async fn history_with_blank_limit_uses_default() {
    let (status, json) = get(memory_app(), "/api/history?limit=").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn stats_group_by_status_and_action() {
    let app = memory_app();
    execute(
        &app,
        json!({ "action": "scale_pods", "params": { "service": "api", "replicas": 2 } }),
    )
    .await;
    execute(&app, json!({ "action": "format_disk", "params": {} })).await;

    let (status, json) = get(app, "/api/history/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 2);
    assert_eq!(json["by_status"]["success"], 1);
    assert_eq!(json["by_status"]["rejected"], 1);
    assert_eq!(json["by_status"]["error"], 0);
    assert_eq!(json["by_action"]["format_disk"], 1);
}

#[tokio::test]
async fn concurrent_requests_against_redb_lose_nothing() {
    let dir = TempDir::new().unwrap();
    let db = AuditDb::open(&dir.path().join("audit.db")).unwrap();
    let exec = Executor::new(ActionRegistry::builtin(), Arc::new(db));
    let app = remedy_server::build_router(AppState::new(exec));

    let bodies = vec![
        json!({ "action": "scale_pods", "params": { "service": "api", "replicas": 4 } }),
        json!({ "action": "restart_service", "params": { "service": "api" } }),
        json!({ "action": "notify_slack", "params": { "channel": "#ops", "message": "hi" } }),
        json!({ "action": "clear_cache", "params": { "service": "api", "scope": "sessions" } }),
        json!({ "action": "rollback_deployment", "params": { "service": "api", "revision": 3 } }),
        json!({ "action": "drain_node", "params": { "node": "worker-2" } }),
    ];
    let n = bodies.len();

    let mut handles = Vec::new();
    for body in bodies {
        let app = app.clone();
        handles.push(tokio::spawn(async move { execute(&app, body).await }));
    }
    let mut ids = std::collections::HashSet::new();
    for h in handles {
        let (status, json) = h.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        ids.insert(json["execution_id"].as_str().unwrap().to_string());
    }
    assert_eq!(ids.len(), n);

    let (_, history) = get(app, "/api/history?limit=100").await;
    let recorded: std::collections::HashSet<_> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(recorded, ids);
}
