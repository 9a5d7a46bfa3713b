use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::StreakError;

/// The participation fields of a user record, plus the optimistic-concurrency
/// token guarding them. The user record itself is owned by the surrounding
/// application; this is the slice the engine reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakRecord {
    pub user_id: Uuid,
    /// Calendar day of the most recent qualifying activity. Always a bare
    /// date; absent until the user's first post or reply.
    pub last_post_date: Option<NaiveDate>,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub participation_points: u64,
    /// Bumped by the store on every successful `save_streak`.
    pub version: i64,
}

/// Storage seam between the engine and the user-record store.
pub trait UserStore {
    fn load_streak(&self, user_id: Uuid) -> Result<StreakRecord, StreakError>;

    /// Conditional write keyed on `record.version`: the fields are persisted
    /// only if the stored version still matches, and the version is bumped on
    /// success. `Ok(false)` means a concurrent writer got there first and
    /// nothing was written.
    fn save_streak(&self, record: &StreakRecord) -> Result<bool, StreakError>;

    /// Every record with a live streak (`current_streak > 0`).
    fn active_streaks(&self) -> Result<Vec<StreakRecord>, StreakError>;
}
