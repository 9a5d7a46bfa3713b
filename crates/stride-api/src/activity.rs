use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;
use uuid::Uuid;

use stride_streaks::ActivityRecorder;
use stride_types::api::{ActivityResponse, RecordActivityRequest};

use crate::{AppState, error_status, snapshot_of};

/// Called by the content-creation flow once per durably stored post or reply.
/// Whether the event was a post or a reply is irrelevant here; both are
/// qualifying activity.
pub async fn record_activity(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<RecordActivityRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let at = req.at.unwrap_or_else(|| state.clock.now());

    // Run the blocking read-modify-write off the async runtime
    let db = state.db.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        ActivityRecorder::new(db.as_ref()).on_activity(user_id, at)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?
    .map_err(error_status)?;

    Ok(Json(ActivityResponse {
        counted: outcome.counted,
        snapshot: snapshot_of(&outcome.record),
    }))
}
