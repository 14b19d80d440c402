pub mod dedup;
pub mod locks;
pub mod raw;

pub use dedup::{group_by_hour, merge_batch};
pub use locks::{HourGuard, HourLocks};
pub use raw::{parse_practice_payload, parse_usage_payload, RawNote, RawUsage};
