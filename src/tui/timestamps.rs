use chrono::{DateTime, Datelike, Utc};

/// Compact timestamp for the messages table, relative to `now`:
/// - Same day: "14:05"
/// - Same year: "Jan 15 14:05"
/// - Older: "2023-12-03 14:05"
pub fn format_timestamp(timestamp: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    if timestamp.date_naive() == now.date_naive() {
        timestamp.format("%H:%M").to_string()
    } else if timestamp.year() == now.year() {
        timestamp.format("%b %-d %H:%M").to_string()
    } else {
        timestamp.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// Full timestamp for the preview pane: "2024-01-15 10:30:00 UTC"
pub fn format_utc(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
