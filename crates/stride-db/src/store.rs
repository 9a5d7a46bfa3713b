use anyhow::anyhow;
use chrono::NaiveDate;
use uuid::Uuid;

use stride_streaks::{StreakError, StreakRecord, UserStore};

use crate::Database;
use crate::models::UserRow;

const DAY_FORMAT: &str = "%Y-%m-%d";

impl UserStore for Database {
    fn load_streak(&self, user_id: Uuid) -> Result<StreakRecord, StreakError> {
        let row = self
            .get_user_by_id(&user_id.to_string())
            .map_err(StreakError::Storage)?
            .ok_or(StreakError::NotFound(user_id))?;
        record_from_row(row)
    }

    fn save_streak(&self, record: &StreakRecord) -> Result<bool, StreakError> {
        let day = record.last_post_date.map(|d| d.format(DAY_FORMAT).to_string());
        self.update_streak_fields(
            &record.user_id.to_string(),
            day.as_deref(),
            record.current_streak as i64,
            record.longest_streak as i64,
            record.participation_points as i64,
            record.version,
        )
        .map_err(StreakError::Storage)
    }

    fn active_streaks(&self) -> Result<Vec<StreakRecord>, StreakError> {
        let rows = self.live_streak_rows().map_err(StreakError::Storage)?;
        rows.into_iter().map(record_from_row).collect()
    }
}

fn record_from_row(row: UserRow) -> Result<StreakRecord, StreakError> {
    let user_id = row
        .id
        .parse::<Uuid>()
        .map_err(|e| StreakError::Storage(anyhow!("corrupt user id '{}': {}", row.id, e)))?;

    let last_post_date = row
        .last_post_date
        .as_deref()
        .map(|s| {
            NaiveDate::parse_from_str(s, DAY_FORMAT).map_err(|e| {
                StreakError::Storage(anyhow!(
                    "corrupt last_post_date '{}' on user '{}': {}",
                    s,
                    row.id,
                    e
                ))
            })
        })
        .transpose()?;

    Ok(StreakRecord {
        user_id,
        last_post_date,
        current_streak: row.current_streak.max(0) as u32,
        longest_streak: row.longest_streak.max(0) as u32,
        participation_points: row.participation_points.max(0) as u64,
        version: row.streak_version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations;
    use chrono::{DateTime, Utc};
    use std::path::Path;
    use stride_streaks::{ActivityRecorder, StaleStreakSweeper};

    fn open_db() -> Database {
        Database::open(Path::new(":memory:")).unwrap()
    }

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn fresh_user_loads_with_zeroed_fields() {
        let db = open_db();
        let id = Uuid::new_v4();
        db.create_user(&id.to_string(), "Jess").unwrap();

        let record = db.load_streak(id).unwrap();
        assert_eq!(
            record,
            StreakRecord {
                user_id: id,
                last_post_date: None,
                current_streak: 0,
                longest_streak: 0,
                participation_points: 0,
                version: 0,
            }
        );
    }

    #[test]
    fn unknown_user_is_not_found() {
        let db = open_db();
        let err = db.load_streak(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, StreakError::NotFound(_)));
    }

    #[test]
    fn save_and_reload_roundtrips_the_date() {
        let db = open_db();
        let id = Uuid::new_v4();
        db.create_user(&id.to_string(), "Jess").unwrap();

        let mut record = db.load_streak(id).unwrap();
        record.last_post_date = Some(day("2021-01-02"));
        record.current_streak = 2;
        record.longest_streak = 2;
        record.participation_points = 2;
        assert!(db.save_streak(&record).unwrap());

        let reloaded = db.load_streak(id).unwrap();
        assert_eq!(reloaded.last_post_date, Some(day("2021-01-02")));
        assert_eq!(reloaded.current_streak, 2);
        assert_eq!(reloaded.version, 1);
    }

    #[test]
    fn conditional_write_rejects_stale_versions() {
        let db = open_db();
        let id = Uuid::new_v4();
        db.create_user(&id.to_string(), "Jess").unwrap();

        let mut record = db.load_streak(id).unwrap();
        record.current_streak = 1;
        record.longest_streak = 1;
        record.participation_points = 1;
        record.last_post_date = Some(day("2021-01-01"));

        assert!(db.save_streak(&record).unwrap());
        // Same version again: a concurrent writer already bumped it.
        assert!(!db.save_streak(&record).unwrap());

        let reloaded = db.load_streak(id).unwrap();
        assert_eq!(reloaded.version, 1);
        assert_eq!(reloaded.participation_points, 1);
    }

    #[test]
    fn migrations_are_idempotent() {
        let db = open_db();
        let id = Uuid::new_v4();
        db.create_user(&id.to_string(), "Jess").unwrap();

        db.with_conn(|conn| migrations::run(conn)).unwrap();

        assert_eq!(db.count_users().unwrap(), 1);
    }

    #[test]
    fn active_streaks_excludes_zeroed_rows() {
        let db = open_db();
        let live = Uuid::new_v4();
        let idle = Uuid::new_v4();
        db.create_user(&live.to_string(), "Jess").unwrap();
        db.create_user(&idle.to_string(), "Sam").unwrap();

        ActivityRecorder::new(&db)
            .on_activity(live, ts("2021-01-01T10:00:00Z"))
            .unwrap();

        let active = db.active_streaks().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].user_id, live);
    }

    #[test]
    fn recorder_and_sweeper_run_against_sqlite() {
        let db = open_db();
        let id = Uuid::new_v4();
        db.create_user(&id.to_string(), "Jess").unwrap();

        let recorder = ActivityRecorder::new(&db);
        recorder.on_activity(id, ts("2021-01-01T10:00:00Z")).unwrap();
        recorder.on_activity(id, ts("2021-01-02T09:00:00Z")).unwrap();

        let record = db.load_streak(id).unwrap();
        assert_eq!(record.current_streak, 2);
        assert_eq!(record.participation_points, 2);

        let sweeper = StaleStreakSweeper::new(&db);
        let alive = sweeper.reset_stale_streaks(ts("2021-01-03T08:00:00Z")).unwrap();
        assert_eq!(alive.reset, 0);

        let stale = sweeper.reset_stale_streaks(ts("2021-01-04T08:00:00Z")).unwrap();
        assert_eq!(stale.reset, 1);

        let record = db.load_streak(id).unwrap();
        assert_eq!(record.current_streak, 0);
        assert_eq!(record.longest_streak, 2);
        assert_eq!(record.participation_points, 2);
        assert_eq!(record.last_post_date, Some(day("2021-01-02")));
    }
}
