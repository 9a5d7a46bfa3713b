use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::error;

use stride_streaks::StaleStreakSweeper;
use stride_types::api::{SweepRequest, SweepResponse};

use crate::{AppState, error_status};

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

/// Manual sweep trigger; the scheduled job runs the same code path.
pub async fn run_sweep(
    State(state): State<AppState>,
    Json(req): Json<SweepRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let now = req.now.unwrap_or_else(|| state.clock.now());

    let db = state.db.clone();
    let report = tokio::task::spawn_blocking(move || {
        StaleStreakSweeper::new(db.as_ref()).reset_stale_streaks(now)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?
    .map_err(error_status)?;

    Ok(Json(SweepResponse {
        scanned: report.scanned,
        reset: report.reset,
        skipped: report.skipped,
        failed: report.failed,
    }))
}
