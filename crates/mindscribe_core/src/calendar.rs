//! Month grid builder and calendar navigation.
//!
//! # Invariants
//! - A grid always holds exactly 42 cells in 6 weeks of 7, Sunday first.
//! - Only current-month cells carry events or the "today" marker.
//! - Months are 0-based (0 = January) at this API boundary.

use crate::model::event::Event;
use chrono::{Datelike, Days, Months, NaiveDate};

pub const DAYS_PER_WEEK: usize = 7;
pub const WEEKS_PER_GRID: usize = 6;
pub const GRID_CELLS: usize = DAYS_PER_WEEK * WEEKS_PER_GRID;

/// One day slot in a month grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub date: NaiveDate,
    /// Day of month, 1-based.
    pub day: u32,
    pub is_current_month: bool,
    pub is_today: bool,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthGrid {
    /// 0-based month.
    pub month: u32,
    pub year: i32,
    pub weeks: Vec<Vec<DayCell>>,
}

impl MonthGrid {
    pub fn cells(&self) -> impl Iterator<Item = &DayCell> {
        self.weeks.iter().flatten()
    }

    /// Number of previous-month cells before the 1st.
    pub fn leading_days(&self) -> usize {
        self.cells().take_while(|cell| !cell.is_current_month).count()
    }
}

/// Displayed (month, year) pair.
///
/// Always points at a representable first-of-month date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarCursor {
    first_of_month: NaiveDate,
}

impl CalendarCursor {
    /// Returns `None` when `month > 11` or the year is out of range.
    pub fn new(month: u32, year: i32) -> Option<Self> {
        let first_of_month = NaiveDate::from_ymd_opt(year, month.checked_add(1)?, 1)?;
        Some(Self { first_of_month })
    }

    /// Cursor on the month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first_of_month: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn month(&self) -> u32 {
        self.first_of_month.month0()
    }

    pub fn year(&self) -> i32 {
        self.first_of_month.year()
    }

    pub fn first_of_month(&self) -> NaiveDate {
        self.first_of_month
    }

    /// Steps back one month, rolling January into the previous December.
    pub fn previous_month(&mut self) {
        if let Some(previous) = self.first_of_month.checked_sub_months(Months::new(1)) {
            self.first_of_month = previous;
        }
    }

    /// Steps forward one month, rolling December into the next January.
    pub fn next_month(&mut self) {
        if let Some(next) = self.first_of_month.checked_add_months(Months::new(1)) {
            self.first_of_month = next;
        }
    }

    /// Jumps to `month`/`year`; returns `false` and stays put when invalid.
    pub fn set(&mut self, month: u32, year: i32) -> bool {
        match Self::new(month, year) {
            Some(cursor) => {
                *self = cursor;
                true
            }
            None => false,
        }
    }

    /// Human label such as `November 2023`.
    pub fn label(&self) -> String {
        self.first_of_month.format("%B %Y").to_string()
    }
}

/// Builds the 6x7 grid for `cursor`'s month.
///
/// `events_on` is consulted once per current-month day.
pub fn build_month_grid<F>(cursor: CalendarCursor, today: NaiveDate, mut events_on: F) -> MonthGrid
where
    F: FnMut(NaiveDate) -> Vec<Event>,
{
    let first = cursor.first_of_month();
    let leading = u64::from(first.weekday().num_days_from_sunday());
    let grid_start = first.checked_sub_days(Days::new(leading)).unwrap_or(first);

    let mut cells = grid_start.iter_days().take(GRID_CELLS).map(|date| {
        let is_current_month = date.month() == first.month() && date.year() == first.year();
        DayCell {
            date,
            day: date.day(),
            is_current_month,
            is_today: is_current_month && date == today,
            events: if is_current_month {
                events_on(date)
            } else {
                Vec::new()
            },
        }
    });

    let mut weeks = Vec::with_capacity(WEEKS_PER_GRID);
    for _ in 0..WEEKS_PER_GRID {
        weeks.push(cells.by_ref().take(DAYS_PER_WEEK).collect());
    }

    MonthGrid {
        month: cursor.month(),
        year: cursor.year(),
        weeks,
    }
}
