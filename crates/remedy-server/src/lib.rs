pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve_on()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(routes::health::health))
        // Actions
        .route("/api/actions", get(routes::actions::list_actions))
        .route(
            "/api/actions/execute",
            post(routes::actions::execute_action),
        )
        // History
        .route("/api/history", get(routes::history::get_history))
        .route("/api/history/stats", get(routes::history::get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Serve the API on a pre-bound listener.
///
/// Accepting a bound `TcpListener` lets the caller read the actual port
/// before starting (useful when `port = 0` and the OS picks a free port).
pub async fn serve_on(app_state: AppState, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(app_state);

    tracing::info!("remedy API listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
