use crate::Database;
use crate::models::UserRow;
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

const USER_COLUMNS: &str = "id, display_name, last_post_date, current_streak, longest_streak, \
                            participation_points, streak_version, created_at";

impl Database {
    // -- Users --

    pub fn create_user(&self, id: &str, display_name: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, display_name) VALUES (?1, ?2)",
                (id, display_name),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn count_users(&self) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
        })
    }

    // -- Streak fields --

    /// Version-checked write of the participation fields. Returns false when
    /// the stored version no longer matches `expected_version` (a concurrent
    /// writer updated the row first); the row is untouched in that case.
    pub fn update_streak_fields(
        &self,
        id: &str,
        last_post_date: Option<&str>,
        current_streak: i64,
        longest_streak: i64,
        participation_points: i64,
        expected_version: i64,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE users SET
                    last_post_date = ?2,
                    current_streak = ?3,
                    longest_streak = ?4,
                    participation_points = ?5,
                    streak_version = streak_version + 1
                 WHERE id = ?1 AND streak_version = ?6",
                rusqlite::params![
                    id,
                    last_post_date,
                    current_streak,
                    longest_streak,
                    participation_points,
                    expected_version
                ],
            )?;
            Ok(changed == 1)
        })
    }

    /// All rows holding a live streak, oldest activity first.
    pub fn live_streak_rows(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users
                 WHERE current_streak > 0
                 ORDER BY last_post_date"
            ))?;
            let rows = stmt
                .query_map([], row_to_user)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_user_by_id(conn: &Connection, id: &str) -> Result<Option<UserRow>> {
    let row = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            [id],
            row_to_user,
        )
        .optional()?;
    Ok(row)
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        display_name: row.get(1)?,
        last_post_date: row.get(2)?,
        current_streak: row.get(3)?,
        longest_streak: row.get(4)?,
        participation_points: row.get(5)?,
        streak_version: row.get(6)?,
        created_at: row.get(7)?,
    })
}
