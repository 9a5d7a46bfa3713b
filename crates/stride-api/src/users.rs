use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;
use uuid::Uuid;

use stride_streaks::UserStore;
use stride_types::api::{CreateUserRequest, CreateUserResponse};

use crate::{AppState, error_status, snapshot_of};

pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let name = req.display_name.trim().to_string();
    if name.is_empty() || name.len() > 64 {
        return Err(StatusCode::BAD_REQUEST);
    }

    let user_id = Uuid::new_v4();

    // Run blocking DB work off the async runtime
    let db = state.db.clone();
    let id = user_id.to_string();
    tokio::task::spawn_blocking(move || db.create_user(&id, &name))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|e| {
            error!("create_user failed: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok((StatusCode::CREATED, Json(CreateUserResponse { user_id })))
}

pub async fn get_streak(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.db.clone();
    let record = tokio::task::spawn_blocking(move || db.load_streak(user_id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(error_status)?;

    Ok(Json(snapshot_of(&record)))
}
