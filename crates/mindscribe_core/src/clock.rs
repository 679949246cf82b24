//! Wall-clock abstraction for time-relative queries.
//!
//! Overdue, due-today and calendar "today" views depend on the current
//! instant and on local calendar-day boundaries. Managers read both through
//! [`Clock`] so tests can pin them.

use chrono::{
    DateTime, Duration, FixedOffset, Local, LocalResult, NaiveDate, Offset, TimeZone, Utc,
};

pub trait Clock {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Local calendar date containing `instant`.
    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate;

    /// First instant of the local calendar day `date`.
    fn local_day_start(&self, date: NaiveDate) -> DateTime<Utc>;

    /// Local calendar date of [`Clock::now`].
    fn today(&self) -> NaiveDate {
        self.local_date(self.now())
    }

    /// Half-open `[start, end)` window covering local day `date`.
    fn local_day_window(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.local_day_start(date);
        let end = date
            .succ_opt()
            .map(|next| self.local_day_start(next))
            .unwrap_or(start + Duration::days(1));
        (start, end)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        (**self).local_date(instant)
    }

    fn local_day_start(&self, date: NaiveDate) -> DateTime<Utc> {
        (**self).local_day_start(date)
    }
}

/// Real clock in the host's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&Local).date_naive()
    }

    fn local_day_start(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
        match Local.from_local_datetime(&midnight) {
            LocalResult::Single(start) => start.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
            // Midnight skipped by a DST jump; the day starts one hour later.
            LocalResult::None => Local
                .from_local_datetime(&(midnight + Duration::hours(1)))
                .earliest()
                .map(|start| start.with_timezone(&Utc))
                .unwrap_or_else(|| midnight.and_utc()),
        }
    }
}

/// Clock frozen at one instant with a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
    offset: FixedOffset,
}

impl FixedClock {
    /// Frozen clock whose local time is UTC.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self::with_offset(now, Utc.fix())
    }

    pub fn with_offset(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { now, offset }
    }

    pub fn set(&mut self, now: DateTime<Utc>) {
        self.now = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    fn local_day_start(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
        (midnight - Duration::seconds(i64::from(self.offset.local_minus_utc()))).and_utc()
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, FixedClock};
    use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};

    #[test]
    fn fixed_clock_day_window_respects_offset() {
        let now = Utc.with_ymd_and_hms(2023, 11, 14, 23, 30, 0).unwrap();
        let clock = FixedClock::with_offset(now, FixedOffset::east_opt(2 * 3600).unwrap());

        let today = clock.today();
        assert_eq!(today, NaiveDate::from_ymd_opt(2023, 11, 15).unwrap());

        let (start, end) = clock.local_day_window(today);
        assert_eq!(start, Utc.with_ymd_and_hms(2023, 11, 14, 22, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2023, 11, 15, 22, 0, 0).unwrap());
    }
}
