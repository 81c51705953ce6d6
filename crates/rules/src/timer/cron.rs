//! Cron normalization and pseudo-clock tick lookup.

use chrono::{DateTime, Utc};
use cron::Schedule;
use tempo_core::Timestamp;

/// Normalize a 5-field cron expression to 6-field by prepending "0 " for seconds.
///
/// The `cron` crate requires 6 fields: `sec min hour day-of-month month day-of-week`.
/// Rule documents may use standard 5-field cron: `min hour day-of-month month day-of-week`.
pub fn normalize_cron(cron_5field: &str) -> String {
    let trimmed = cron_5field.trim();
    let field_count = trimmed.split_whitespace().count();
    if field_count == 5 {
        format!("0 {}", trimmed)
    } else {
        // Already 6-field or non-standard; pass through as-is.
        trimmed.to_string()
    }
}

/// First scheduled tick strictly after `after`, in pseudo-clock milliseconds.
///
/// The pseudo clock is interpreted as milliseconds since the Unix epoch (UTC).
pub(crate) fn next_tick(schedule: &Schedule, after: Timestamp) -> Option<Timestamp> {
    let from: DateTime<Utc> = DateTime::from_timestamp_millis(after)?;
    schedule
        .after(&from)
        .next()
        .map(|tick| tick.timestamp_millis())
}
