use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};

use crate::models::hour_key;

/// `[local midnight, next local midnight)` for `date`, expressed in UTC.
pub fn day_window(date: NaiveDate, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    let start = offset
        .from_local_datetime(&midnight)
        .single()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight));
    (start, start + Duration::days(1))
}

/// The calendar date `instant` falls on at `offset`.
pub fn local_date(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

/// Hour keys of every batch that can hold samples inside `[start, end)`,
/// including the partial hours at either edge.
pub fn hours_in_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let mut hours = Vec::new();
    let mut hour = hour_key(start);
    while hour < end {
        hours.push(hour);
        hour += Duration::hours(1);
    }
    hours
}
