use axum::extract::State;
use axum::Json;
use remedy_core::executor::{ActionRequest, ExecutionOutcome};
use remedy_core::registry::ActionDefinition;

use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /api/actions: the allowlist
// ---------------------------------------------------------------------------

/// GET /api/actions: every permitted action with its required parameters.
pub async fn list_actions(State(app): State<AppState>) -> Json<Vec<ActionDefinition>> {
    let defs = app
        .executor
        .list_actions()
        .into_iter()
        .cloned()
        .collect();
    Json(defs)
}

// ---------------------------------------------------------------------------
// POST /api/actions/execute: run one action
// ---------------------------------------------------------------------------

/// POST /api/actions/execute: gate, run, and audit a single action.
///
/// Returns 200 with the outcome when the action was attempted, including
/// when the effect itself failed (`status: "error"`).
/// Returns 403 if the action is not on the allowlist (the attempt is audited).
/// Returns 400 if a required parameter is missing or a value is invalid.
pub async fn execute_action(
    State(app): State<AppState>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<ExecutionOutcome>, AppError> {
    let executor = app.executor.clone();
    let outcome = tokio::task::spawn_blocking(move || executor.execute(request))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(outcome))
}
