//! Wall-clock helpers for feed timestamps.

use chrono::{DateTime, NaiveTime, TimeZone, Timelike};
use chrono_tz::Tz;

/// Parse a `HH:MM` time of day as entered in the event form.
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// Convert epoch seconds into a zoned datetime.
pub fn to_zoned(epoch_seconds: i64, timezone: Tz) -> Option<DateTime<Tz>> {
    timezone.timestamp_opt(epoch_seconds, 0).single()
}

/// Hour and minute of an epoch timestamp in the given zone.
pub fn hour_minute(epoch_seconds: i64, timezone: Tz) -> Option<(u32, u32)> {
    to_zoned(epoch_seconds, timezone).map(|dt| (dt.hour(), dt.minute()))
}

/// 12-hour clock, e.g. `7:30 PM`.
pub fn format_time(epoch_seconds: i64, timezone: Tz) -> String {
    match to_zoned(epoch_seconds, timezone) {
        Some(dt) => dt.format("%-I:%M %p").to_string(),
        None => "--:--".to_string(),
    }
}

/// `7:30 PM - 9:00 PM`
pub fn format_time_range(start: i64, end: i64, timezone: Tz) -> String {
    format!(
        "{} - {}",
        format_time(start, timezone),
        format_time(end, timezone)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_parse_hhmm() {
        assert_eq!(parse_hhmm("14:30"), NaiveTime::from_hms_opt(14, 30, 0));
        assert_eq!(parse_hhmm(" 09:05 "), NaiveTime::from_hms_opt(9, 5, 0));
        assert!(parse_hhmm("24:00").is_none());
        assert!(parse_hhmm("noon").is_none());
        assert!(parse_hhmm("").is_none());
    }

    #[test]
    fn test_format_time_twelve_hour() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 22, 19, 30, 0).unwrap().timestamp();
        assert_eq!(format_time(ts, Tz::UTC), "7:30 PM");

        let ts = Utc.with_ymd_and_hms(2026, 1, 23, 0, 5, 0).unwrap().timestamp();
        assert_eq!(format_time(ts, Tz::UTC), "12:05 AM");
    }

    #[test]
    fn test_hour_minute_in_zone() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 23, 2, 0, 0).unwrap().timestamp();
        let tz: Tz = "America/New_York".parse().unwrap();
        assert_eq!(hour_minute(ts, tz), Some((21, 0)));
    }
}
