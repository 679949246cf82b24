//! Date formatting and range helpers for front ends.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, TimeZone, Utc};
use std::fmt::Display;

const RELATIVE_CUTOFF_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateStyle {
    /// `Nov 14, 2023`
    Short,
    /// `Nov 14, 2023 14:00`
    #[default]
    Medium,
    /// `Tuesday, November 14, 2023 14:00:00`
    Long,
    /// `14:00`
    Time,
}

impl DateStyle {
    fn pattern(self) -> &'static str {
        match self {
            Self::Short => "%b %-d, %Y",
            Self::Medium => "%b %-d, %Y %H:%M",
            Self::Long => "%A, %B %-d, %Y %H:%M:%S",
            Self::Time => "%H:%M",
        }
    }
}

/// Formats `instant` in its own time zone.
pub fn format_date<Tz>(instant: &DateTime<Tz>, style: DateStyle) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    instant.format(style.pattern()).to_string()
}

/// Coarse "time ago" phrase for `then` as seen at `now`.
///
/// Instants more than 30 days old fall back to a short date; future
/// instants read as "just now".
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let days = elapsed.num_days();
    let hours = elapsed.num_hours();
    let minutes = elapsed.num_minutes();

    if days > RELATIVE_CUTOFF_DAYS {
        return format_date(&then, DateStyle::Short);
    }
    match (days, hours, minutes) {
        (1, _, _) => "yesterday".to_string(),
        (d, _, _) if d > 1 => format!("{d} days ago"),
        (_, 1, _) => "1 hour ago".to_string(),
        (_, h, _) if h > 1 => format!("{h} hours ago"),
        (_, _, 1) => "1 minute ago".to_string(),
        (_, _, m) if m > 1 => format!("{m} minutes ago"),
        _ => "just now".to_string(),
    }
}

/// Monday-to-Sunday week containing `date`.
pub fn week_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let from_monday = u64::from(date.weekday().num_days_from_monday());
    let start = date.checked_sub_days(Days::new(from_monday)).unwrap_or(date);
    let end = start.checked_add_days(Days::new(6)).unwrap_or(start);
    (start, end)
}

/// First and last day of month `month` (0 = January) of `year`.
pub fn month_range(month: u32, year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month.checked_add(1)?, 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((first, last))
}

#[cfg(test)]
mod tests {
    use super::{format_date, month_range, relative_time, week_range, DateStyle};
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    #[test]
    fn formats_each_style() {
        let instant = Utc.with_ymd_and_hms(2023, 11, 14, 14, 5, 9).unwrap();
        assert_eq!(format_date(&instant, DateStyle::Short), "Nov 14, 2023");
        assert_eq!(format_date(&instant, DateStyle::Medium), "Nov 14, 2023 14:05");
        assert_eq!(
            format_date(&instant, DateStyle::Long),
            "Tuesday, November 14, 2023 14:05:09"
        );
        assert_eq!(format_date(&instant, DateStyle::Time), "14:05");
    }

    #[test]
    fn relative_time_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(relative_time(now - Duration::seconds(20), now), "just now");
        assert_eq!(relative_time(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(relative_time(now - Duration::minutes(45), now), "45 minutes ago");
        assert_eq!(relative_time(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(relative_time(now - Duration::hours(30), now), "yesterday");
        assert_eq!(relative_time(now - Duration::days(6), now), "6 days ago");
        assert_eq!(relative_time(now - Duration::days(40), now), "Jan 30, 2024");
        assert_eq!(relative_time(now + Duration::hours(2), now), "just now");
    }

    #[test]
    fn week_range_starts_on_monday() {
        // 2023-11-19 is a Sunday.
        let sunday = NaiveDate::from_ymd_opt(2023, 11, 19).unwrap();
        let (start, end) = week_range(sunday);
        assert_eq!(start, NaiveDate::from_ymd_opt(2023, 11, 13).unwrap());
        assert_eq!(end, sunday);
    }

    #[test]
    fn month_range_handles_leap_years() {
        let (first, last) = month_range(1, 2024).unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(month_range(12, 2024).is_none());
    }
}
