//! Identity types for call records

use chrono::{DateTime, Utc};

/// Call identifier, unique across one input set.
pub type CallId = i64;

/// Timestamp type using UTC timezone.
/// Call boundaries carry second-level granularity.
pub type Timestamp = DateTime<Utc>;

/// Build a timestamp from whole seconds since the Unix epoch.
///
/// Out-of-range values clamp to the Unix epoch.
pub fn timestamp_from_secs(secs: i64) -> Timestamp {
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH)
}
