use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id                    TEXT PRIMARY KEY,
            display_name          TEXT NOT NULL,
            last_post_date        TEXT,
            current_streak        INTEGER NOT NULL DEFAULT 0,
            longest_streak        INTEGER NOT NULL DEFAULT 0,
            participation_points  INTEGER NOT NULL DEFAULT 0,
            streak_version        INTEGER NOT NULL DEFAULT 0,
            created_at            TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- The sweep only ever scans live streaks.
        CREATE INDEX IF NOT EXISTS idx_users_live_streak
            ON users(current_streak) WHERE current_streak > 0;
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
