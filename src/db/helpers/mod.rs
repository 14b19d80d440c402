use std::convert::TryFrom;

use anyhow::{anyhow, Result};
use chrono::{DateTime, TimeZone, Utc};

pub fn to_i64(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| anyhow!("value {value} exceeds SQLite INTEGER range"))
}

/// Hour keys are stored as unix seconds.
pub fn hour_from_key(value: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(value, 0)
        .single()
        .ok_or_else(|| anyhow!("hour key {value} is out of range"))
}

/// Piece keys are stored as unix milliseconds.
pub fn instant_from_millis(value: i64, field: &str) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(value)
        .single()
        .ok_or_else(|| anyhow!("{field} value {value} is out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hour_keys_round_trip_through_unix_seconds() {
        let hour = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        assert_eq!(hour_from_key(hour.timestamp()).expect("hour"), hour);
    }

    #[test]
    fn oversized_values_are_rejected() {
        assert!(to_i64(u64::MAX).is_err());
    }

    #[test]
    fn piece_keys_keep_millisecond_precision() {
        let at = Utc.timestamp_millis_opt(1_714_554_090_500).unwrap();
        assert_eq!(
            instant_from_millis(at.timestamp_millis(), "started_at").expect("instant"),
            at
        );
    }
}
