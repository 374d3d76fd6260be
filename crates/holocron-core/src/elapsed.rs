//! Human-readable "time ago" rendering.

use chrono::{DateTime, Utc};

const SECONDS_PER_DAY: i64 = 86_400;

/// Describe how long ago `then` was, relative to `now`.
///
/// Values are rounded to the nearest unit: 45 days is "1 month ago",
/// 50 days is "2 months ago", 12+ hours past a day rounds up a day.
pub fn describe_elapsed(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let total = now.signed_duration_since(then).num_seconds();
    if total <= 10 {
        return "just now".to_string();
    }

    let days = total / SECONDS_PER_DAY;
    if days >= 365 {
        return "more than 1 year ago".to_string();
    }

    let within_day = total % SECONDS_PER_DAY;
    let hours = within_day / 3600;
    let minutes = (within_day % 3600) / 60;
    let seconds = within_day % 60;

    let months = (days as f64 / 30.5).floor() as i64;
    if months > 0 {
        let round_up = ((days as f64 / 15.25).floor() as i64) % 2 == 1;
        return ago(months + i64::from(round_up), "month");
    }
    if days > 0 {
        return ago(days + i64::from(hours >= 12), "day");
    }
    if hours > 0 {
        return ago(hours + i64::from(minutes >= 30), "hour");
    }
    if minutes > 0 {
        return ago(minutes + i64::from(seconds >= 30), "minute");
    }

    format!("{} seconds ago", seconds)
}

fn ago(count: i64, unit: &str) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("{} {}{} ago", count, unit, plural)
}
