use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::day::{day_of, days_between};
use crate::error::StreakError;
use crate::store::{StreakRecord, UserStore};

/// Read-modify-write attempts before a lost race is surfaced to the caller.
const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Result of recording one qualifying activity.
#[derive(Debug, Clone)]
pub struct ActivityOutcome {
    /// True when the activity was the first of its calendar day and moved the
    /// participation fields; false for same-day repeats and backdated events.
    pub counted: bool,
    pub record: StreakRecord,
}

/// Applies a qualifying activity (a post or reply) to a user's participation
/// fields. Invoked by the content-creation flow after the content is durably
/// stored; stateless beyond the record it mutates.
pub struct ActivityRecorder<'a, S: UserStore> {
    store: &'a S,
}

impl<'a, S: UserStore> ActivityRecorder<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Record one activity at `at`. Idempotent within a calendar day: only
    /// the first activity of a given day writes anything.
    pub fn on_activity(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<ActivityOutcome, StreakError> {
        let day = day_of(at);

        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let mut record = self.store.load_streak(user_id)?;

            if !apply_activity(&mut record, day) {
                // Same-day repeat or backdated event: nothing to persist.
                return Ok(ActivityOutcome {
                    counted: false,
                    record,
                });
            }

            if self.store.save_streak(&record)? {
                debug!(%user_id, %day, streak = record.current_streak, "activity recorded");
                return Ok(ActivityOutcome {
                    counted: true,
                    record,
                });
            }

            debug!(%user_id, attempt, "streak write lost a race, re-reading");
        }

        Err(StreakError::ConcurrentModification {
            user_id,
            attempts: MAX_WRITE_ATTEMPTS,
        })
    }
}

/// The day-distance transition. Returns false when the record is unchanged:
/// a repeat on an already-counted day, or an out-of-order event older than
/// the recorded last post day (the record is never regressed).
fn apply_activity(record: &mut StreakRecord, day: NaiveDate) -> bool {
    match record.last_post_date.map(|last| days_between(last, day)) {
        Some(0) => return false,
        Some(delta) if delta < 0 => return false,
        // The day right after the last post extends the streak.
        Some(1) => record.current_streak += 1,
        // First activity ever, or a gap of two or more days.
        None | Some(_) => record.current_streak = 1,
    }

    record.participation_points += 1;
    record.last_post_date = Some(day);
    record.longest_streak = record.longest_streak.max(record.current_streak);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_store::{ContendedStore, MemoryStore};

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn first_post_starts_a_streak() {
        let user = Uuid::new_v4();
        let store = MemoryStore::with_user(user);

        let outcome = ActivityRecorder::new(&store)
            .on_activity(user, ts("2021-01-01T09:30:00Z"))
            .unwrap();

        assert!(outcome.counted);
        let record = store.get(user);
        assert_eq!(record.current_streak, 1);
        assert_eq!(record.longest_streak, 1);
        assert_eq!(record.participation_points, 1);
        assert_eq!(record.last_post_date, Some(day("2021-01-01")));
    }

    #[test]
    fn repeat_posts_on_one_day_count_once() {
        let user = Uuid::new_v4();
        let store = MemoryStore::with_user(user);
        let recorder = ActivityRecorder::new(&store);

        let first = recorder.on_activity(user, ts("2021-01-01T08:00:00Z")).unwrap();
        assert!(first.counted);
        let version_after_first = store.get(user).version;

        let second = recorder.on_activity(user, ts("2021-01-01T21:15:00Z")).unwrap();
        assert!(!second.counted);

        let record = store.get(user);
        assert_eq!(record.current_streak, 1);
        assert_eq!(record.longest_streak, 1);
        assert_eq!(record.participation_points, 1);
        // The same-day path must not write at all.
        assert_eq!(record.version, version_after_first);
    }

    #[test]
    fn consecutive_days_extend_the_streak() {
        let user = Uuid::new_v4();
        let store = MemoryStore::with_user(user);
        let recorder = ActivityRecorder::new(&store);

        recorder.on_activity(user, ts("2021-01-01T12:00:00Z")).unwrap();
        recorder.on_activity(user, ts("2021-01-02T12:00:00Z")).unwrap();

        let record = store.get(user);
        assert_eq!(record.current_streak, 2);
        assert_eq!(record.longest_streak, 2);
        assert_eq!(record.participation_points, 2);
        assert_eq!(record.last_post_date, Some(day("2021-01-02")));
    }

    #[test]
    fn a_gap_resets_current_but_keeps_longest() {
        let user = Uuid::new_v4();
        let store = MemoryStore::with_user(user);
        let recorder = ActivityRecorder::new(&store);

        recorder.on_activity(user, ts("2021-01-01T12:00:00Z")).unwrap();
        recorder.on_activity(user, ts("2021-01-02T12:00:00Z")).unwrap();
        recorder.on_activity(user, ts("2021-01-04T12:00:00Z")).unwrap();

        let record = store.get(user);
        assert_eq!(record.current_streak, 1);
        assert_eq!(record.longest_streak, 2);
        assert_eq!(record.participation_points, 3);
        assert_eq!(record.last_post_date, Some(day("2021-01-04")));
    }

    #[test]
    fn backdated_activity_is_ignored() {
        let user = Uuid::new_v4();
        let store = MemoryStore::with_user(user);
        let recorder = ActivityRecorder::new(&store);

        recorder.on_activity(user, ts("2021-01-05T12:00:00Z")).unwrap();
        let before = store.get(user);

        let outcome = recorder.on_activity(user, ts("2021-01-03T12:00:00Z")).unwrap();

        assert!(!outcome.counted);
        assert_eq!(store.get(user), before);
    }

    #[test]
    fn unknown_user_is_not_found() {
        let store = MemoryStore::default();
        let missing = Uuid::new_v4();

        let err = ActivityRecorder::new(&store)
            .on_activity(missing, ts("2021-01-01T12:00:00Z"))
            .unwrap_err();

        assert!(matches!(err, StreakError::NotFound(id) if id == missing));
    }

    #[test]
    fn lost_race_is_retried() {
        let user = Uuid::new_v4();
        let store = ContendedStore::new(MemoryStore::with_user(user), 1);

        let outcome = ActivityRecorder::new(&store)
            .on_activity(user, ts("2021-01-01T12:00:00Z"))
            .unwrap();

        assert!(outcome.counted);
        assert_eq!(store.inner.get(user).participation_points, 1);
    }

    #[test]
    fn conflict_surfaces_after_bounded_retries() {
        let user = Uuid::new_v4();
        let store = ContendedStore::new(MemoryStore::with_user(user), u32::MAX);

        let err = ActivityRecorder::new(&store)
            .on_activity(user, ts("2021-01-01T12:00:00Z"))
            .unwrap_err();

        assert!(matches!(
            err,
            StreakError::ConcurrentModification { attempts: 3, .. }
        ));
        assert_eq!(store.inner.get(user).participation_points, 0);
    }

    #[test]
    fn longest_streak_never_decreases() {
        let user = Uuid::new_v4();
        let store = MemoryStore::with_user(user);
        let recorder = ActivityRecorder::new(&store);

        let days = [
            "2021-01-01", "2021-01-02", "2021-01-03", // streak of three
            "2021-01-10", "2021-01-11", // shorter streak after a gap
        ];

        let mut longest_seen = 0;
        for d in days {
            recorder
                .on_activity(user, ts(&format!("{d}T12:00:00Z")))
                .unwrap();
            let record = store.get(user);
            assert!(record.longest_streak >= longest_seen);
            assert!(record.current_streak <= record.longest_streak);
            longest_seen = record.longest_streak;
        }

        assert_eq!(store.get(user).longest_streak, 3);
    }
}
