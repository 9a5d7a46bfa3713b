use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::day::{day_of, days_between};
use crate::error::StreakError;
use crate::store::{StreakRecord, UserStore};

/// A streak survives the whole day after the last post; it goes stale on the
/// second midnight with no activity.
const STALE_AFTER_DAYS: i64 = 2;

/// Tally of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Records with a live streak that were examined.
    pub scanned: usize,
    /// Streaks zeroed.
    pub reset: usize,
    /// Stale-looking records left alone because a concurrent post beat the
    /// zeroing write.
    pub skipped: usize,
    /// Records whose update failed; the sweep moved on past them.
    pub failed: usize,
}

/// Periodic pass that converts passed time into broken streaks. The recorder
/// only runs on new activity, so inactivity has to be noticed here.
pub struct StaleStreakSweeper<'a, S: UserStore> {
    store: &'a S,
}

impl<'a, S: UserStore> StaleStreakSweeper<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Zero every streak whose last activity day is two or more calendar days
    /// before `now`. Longest streak, points and last post day are never
    /// touched. Safe to re-run with the same or a later `now`.
    pub fn reset_stale_streaks(&self, now: DateTime<Utc>) -> Result<SweepReport, StreakError> {
        let today = day_of(now);
        let candidates = self.store.active_streaks()?;

        let mut report = SweepReport {
            scanned: candidates.len(),
            ..Default::default()
        };

        for record in candidates {
            let user_id = record.user_id;
            match self.sweep_one(record, today) {
                Ok(SweepOutcome::Reset) => report.reset += 1,
                Ok(SweepOutcome::Alive) => {}
                Ok(SweepOutcome::LostRace) => report.skipped += 1,
                Err(e) => {
                    warn!(%user_id, error = %e, "stale-streak reset failed, continuing");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    fn sweep_one(
        &self,
        mut record: StreakRecord,
        today: NaiveDate,
    ) -> Result<SweepOutcome, StreakError> {
        match record.last_post_date {
            Some(last) if days_between(last, today) < STALE_AFTER_DAYS => {
                return Ok(SweepOutcome::Alive);
            }
            Some(_) => {}
            // A live streak with no recorded day cannot satisfy the field
            // rules; heal it instead of skipping it forever.
            None => warn!(user_id = %record.user_id, "live streak with no last post day, zeroing"),
        }

        record.current_streak = 0;
        if self.store.save_streak(&record)? {
            debug!(user_id = %record.user_id, "stale streak zeroed");
            Ok(SweepOutcome::Reset)
        } else {
            // The user posted while the sweep ran and the record moved on
            // under us; the next pass re-checks it.
            Ok(SweepOutcome::LostRace)
        }
    }
}

enum SweepOutcome {
    Reset,
    Alive,
    LostRace,
}
