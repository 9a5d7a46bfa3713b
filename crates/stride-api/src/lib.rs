pub mod activity;
pub mod maintenance;
pub mod users;

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::error;

use stride_db::Database;
use stride_streaks::{Clock, StreakError, StreakRecord};
use stride_types::api::StreakSnapshot;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub clock: Arc<dyn Clock>,
}

pub(crate) fn error_status(e: StreakError) -> StatusCode {
    match e {
        StreakError::NotFound(_) => StatusCode::NOT_FOUND,
        StreakError::ConcurrentModification { .. } => StatusCode::CONFLICT,
        StreakError::Storage(e) => {
            error!("storage error: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub(crate) fn snapshot_of(record: &StreakRecord) -> StreakSnapshot {
    StreakSnapshot {
        user_id: record.user_id,
        current_streak: record.current_streak,
        longest_streak: record.longest_streak,
        participation_points: record.participation_points,
        last_post_date: record.last_post_date,
    }
}
