use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::categorize::CategoryNode;
use crate::models::Interval;
use crate::timeline::{Reconstruction, SPACER_LABEL};

/// One bar of a timeline lane, in unix milliseconds.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct LaneTime {
    pub starting_time: i64,
    pub ending_time: i64,
}

impl From<&Interval> for LaneTime {
    fn from(interval: &Interval) -> Self {
        Self {
            starting_time: interval.start_time.timestamp_millis(),
            ending_time: interval.end_time.timestamp_millis(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Lane {
    pub label: String,
    pub times: Vec<LaneTime>,
}

/// Everything a day view renders: the usage tree, one lane per host
/// (after the spacer lane), and the active total.
#[derive(Debug, Clone, Serialize)]
pub struct DailyReport {
    pub date: String,
    /// Day start, unix seconds.
    pub timestamp: i64,
    pub usage: CategoryNode,
    pub lanes: Vec<Lane>,
    pub total_secs: i64,
}

impl DailyReport {
    pub fn new(date: NaiveDate, day_start: DateTime<Utc>, reconstruction: Reconstruction) -> Self {
        let Reconstruction { usage, timeline } = reconstruction;

        let mut lanes = Vec::with_capacity(timeline.hosts.len() + 1);
        lanes.push(Lane {
            label: SPACER_LABEL.to_string(),
            times: timeline.spacers.iter().map(LaneTime::from).collect(),
        });
        lanes.extend(timeline.hosts.iter().map(|host| Lane {
            label: host.hostname.clone(),
            times: host.intervals.iter().map(LaneTime::from).collect(),
        }));

        Self {
            date: date.format("%Y-%m-%d").to_string(),
            timestamp: day_start.timestamp(),
            usage,
            lanes,
            total_secs: timeline.total_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HostTimeline, Timeline};
    use chrono::{Duration, TimeZone};

    #[test]
    fn lanes_start_with_spacers_and_use_milliseconds() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let end = start + Duration::days(1);
        let spacer = |at| Interval {
            hostname: SPACER_LABEL.into(),
            start_time: at,
            end_time: at,
        };
        let work = Interval {
            hostname: "laptop".into(),
            start_time: start + Duration::hours(9),
            end_time: start + Duration::hours(9) + Duration::seconds(50),
        };
        let reconstruction = Reconstruction {
            usage: CategoryNode::Internal {
                name: "AppUsage".into(),
                children: Vec::new(),
            },
            timeline: Timeline {
                spacers: [spacer(start), spacer(end)],
                hosts: vec![HostTimeline {
                    hostname: "laptop".into(),
                    intervals: vec![work],
                }],
                total_secs: 50,
            },
        };

        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let report = DailyReport::new(date, start, reconstruction);
        assert_eq!(report.date, "2024-05-01");
        assert_eq!(report.timestamp, 1_714_521_600);
        assert_eq!(report.lanes[0].label, "spacers");
        assert_eq!(report.lanes[0].times[1].starting_time, end.timestamp_millis());
        assert_eq!(report.lanes[1].label, "laptop");
        assert_eq!(
            report.lanes[1].times[0].ending_time - report.lanes[1].times[0].starting_time,
            50_000
        );

        let json = serde_json::to_value(&report).expect("json");
        assert_eq!(json["total_secs"], 50);
        assert_eq!(json["lanes"][1]["times"][0]["starting_time"], 1_714_554_000_000i64);
    }
}
