use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Whether the share board refresher is still running.
    pub share_board_running: bool,
}

/// GET /health -- returns service, database and background task health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = itinera_db::health_check(&state.pool).await.is_ok();
    let share_board_running = state.share_board.is_running();

    let status = if db_healthy && share_board_running {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        share_board_running,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
