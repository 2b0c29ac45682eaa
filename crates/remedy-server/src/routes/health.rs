use axum::extract::State;
use axum::Json;

use crate::state::AppState;

/// GET /api/health: liveness plus the size of the allowlist.
pub async fn health(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "actions": app.executor.registry().len(),
    }))
}
