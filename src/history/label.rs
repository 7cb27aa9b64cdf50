//! Short relative labels for history rows

use crate::model::parse_timestamp;
use chrono::{DateTime, TimeZone};

const MINUTE_MS: i64 = 60 * 1000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Label a stored timestamp relative to `now`.
///
/// Sub-day labels floor the elapsed time. Past a day, the label counts
/// calendar days in `now`'s time zone and falls back to `M/D/YYYY` after a
/// week. Unparseable input is returned as-is.
pub fn relative_label<Tz: TimeZone>(timestamp: &str, now: &DateTime<Tz>) -> String {
    let Some(at) = parse_timestamp(timestamp) else {
        return timestamp.to_string();
    };

    let elapsed = now
        .clone()
        .signed_duration_since(at)
        .num_milliseconds();

    if elapsed < MINUTE_MS {
        return "Just now".to_string();
    }
    if elapsed < HOUR_MS {
        return format!("{}m ago", elapsed.div_euclid(MINUTE_MS));
    }
    if elapsed < DAY_MS {
        return format!("{}h ago", elapsed.div_euclid(HOUR_MS));
    }

    let local = at.with_timezone(&now.timezone());
    let days = (now.date_naive() - local.date_naive()).num_days();
    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        d if d < 7 => format!("{d}d ago"),
        _ => local.date_naive().format("%-m/%-d/%Y").to_string(),
    }
}
