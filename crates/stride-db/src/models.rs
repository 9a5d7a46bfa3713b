/// Database row types, mapping directly to SQLite rows. Distinct from the
/// engine's `StreakRecord` and the API types to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub display_name: String,
    /// `YYYY-MM-DD`, or NULL before the first qualifying activity.
    pub last_post_date: Option<String>,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub participation_points: i64,
    pub streak_version: i64,
    pub created_at: String,
}
