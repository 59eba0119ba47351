//! Display formatting shared by API payloads (durations, dates, percentages).

use crate::types::Timestamp;

/// Minutes per hour.
const MINUTES_PER_HOUR: i64 = 60;

/// Past this many days a relative label falls back to the calendar date.
const RELATIVE_DAYS_CUTOFF: i64 = 30;

/// Format a duration given in minutes as `"1h 5m"`, `"45m"` or `"2h"`.
///
/// Zero and negative durations render as `"0m"`.
pub fn format_duration(minutes: i64) -> String {
    if minutes <= 0 {
        return "0m".to_string();
    }
    let hours = minutes / MINUTES_PER_HOUR;
    let mins = minutes % MINUTES_PER_HOUR;
    match (hours, mins) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

/// Calendar date in the console's short style, e.g. `"Jan 5, 2024"`.
pub fn format_date(ts: Timestamp) -> String {
    ts.format("%b %-d, %Y").to_string()
}

/// Human relative time such as `"3 hours ago"`.
pub fn format_relative(ts: Timestamp, now: Timestamp) -> String {
    let elapsed = now.signed_duration_since(ts);
    let secs = elapsed.num_seconds();

    if secs < 60 {
        return "just now".to_string();
    }
    let minutes = elapsed.num_minutes();
    if minutes < 60 {
        return plural(minutes, "minute");
    }
    let hours = elapsed.num_hours();
    if hours < 24 {
        return plural(hours, "hour");
    }
    let days = elapsed.num_days();
    if days <= RELATIVE_DAYS_CUTOFF {
        return plural(days, "day");
    }
    format_date(ts)
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Percentage with one decimal, e.g. `"42.5%"`.
pub fn format_percentage(value: f64) -> String {
    format!("{:.1}%", round1(value))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    #[test]
    fn duration_hours_and_minutes() {
        assert_eq!(format_duration(65), "1h 5m");
        assert_eq!(format_duration(45), "45m");
        assert_eq!(format_duration(120), "2h");
        assert_eq!(format_duration(0), "0m");
        assert_eq!(format_duration(-3), "0m");
    }

    #[test]
    fn date_uses_short_month() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 5, 23, 0, 0).unwrap();
        assert_eq!(format_date(ts), "Jan 5, 2024");
    }

    #[test]
    fn relative_time_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(format_relative(now - Duration::seconds(10), now), "just now");
        assert_eq!(format_relative(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(format_relative(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(format_relative(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(format_relative(now - Duration::days(2), now), "2 days ago");
        assert_eq!(format_relative(now - Duration::days(45), now), "May 1, 2024");
    }

    #[test]
    fn percentage_has_one_decimal() {
        assert_eq!(format_percentage(42.44), "42.4%");
        assert_eq!(format_percentage(100.0), "100.0%");
        assert_eq!(round1(66.666), 66.7);
    }
}
