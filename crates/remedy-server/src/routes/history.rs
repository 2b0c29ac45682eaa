use axum::extract::{Query, State};
use axum::Json;
use remedy_core::audit::{AuditRecord, AuditStats, HistoryFilter};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub status: Option<String>,
    /// Kept as text so a malformed value is reported as `invalid_filter`.
    pub limit: Option<String>,
}

/// GET /api/history?status=&limit=: audit records, newest first.
///
/// Returns 400 if `status` is not one of success, rejected, error, or if
/// `limit` is not a non-negative integer.
/// `limit` is clamped to the configured maximum.
pub async fn get_history(
    State(app): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<AuditRecord>>, AppError> {
    let executor = app.executor.clone();
    let records = tokio::task::spawn_blocking(move || {
        let limit = HistoryFilter::parse_limit(query.limit.as_deref())?;
        executor.history(query.status.as_deref(), limit)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(records))
}

/// GET /api/history/stats: record counts by status and by action.
pub async fn get_stats(State(app): State<AppState>) -> Result<Json<AuditStats>, AppError> {
    let executor = app.executor.clone();
    let stats = tokio::task::spawn_blocking(move || executor.stats())
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(stats))
}
