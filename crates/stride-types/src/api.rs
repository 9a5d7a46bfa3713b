use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    pub display_name: String,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub user_id: Uuid,
}

// -- Participation --

/// Reported by the content-creation flow once per durably stored post or
/// reply. `at` defaults to the server clock when omitted.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordActivityRequest {
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    /// True when this was the first qualifying activity of its calendar day.
    pub counted: bool,
    #[serde(flatten)]
    pub snapshot: StreakSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakSnapshot {
    pub user_id: Uuid,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub participation_points: u64,
    pub last_post_date: Option<NaiveDate>,
}

// -- Maintenance --

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct SweepRequest {
    pub now: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub scanned: usize,
    pub reset: usize,
    pub skipped: usize,
    pub failed: usize,
}
