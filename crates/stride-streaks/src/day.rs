use chrono::{DateTime, NaiveDate, Utc};

/// Calendar day of a timestamp, at the UTC day boundary.
///
/// Every streak and points comparison goes through this; the time-of-day of
/// an activity never matters, only which day it lands on.
pub fn day_of(ts: DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}

/// Signed distance from `from` to `to` in whole calendar days.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}
