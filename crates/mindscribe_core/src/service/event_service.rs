//! Calendar queries on top of the generic event manager.

use crate::calendar::{build_month_grid, CalendarCursor, MonthGrid};
use crate::clock::Clock;
use crate::model::event::Event;
use crate::repo::kv_repo::KvRepository;
use crate::service::entity_manager::EntityManager;
use chrono::{Months, NaiveDate};

pub type EventManager<R, C> = EntityManager<Event, R, C>;

impl<R: KvRepository, C: Clock> EntityManager<Event, R, C> {
    /// Events starting within the local calendar day `date`.
    pub fn events_on_date(&self, date: NaiveDate) -> Vec<Event> {
        let (start, end) = self.clock().local_day_window(date);
        self.collect_where(|event| event.start >= start && event.start < end)
    }

    pub fn events_today(&self) -> Vec<Event> {
        self.events_on_date(self.clock().today())
    }

    /// Events starting within month `month` (0 = January) of `year`.
    ///
    /// Returns nothing for an out-of-range month.
    pub fn events_in_month(&self, month: u32, year: i32) -> Vec<Event> {
        let Some(first) = CalendarCursor::new(month, year).map(|cursor| cursor.first_of_month())
        else {
            return Vec::new();
        };
        let clock = self.clock();
        let start = clock.local_day_start(first);
        let end = first
            .checked_add_months(Months::new(1))
            .map(|next| clock.local_day_start(next));

        self.collect_where(|event| {
            event.start >= start && end.map_or(true, |end| event.start < end)
        })
    }

    /// Next `limit` events that have not started yet, soonest first.
    pub fn upcoming(&self, limit: usize) -> Vec<Event> {
        let now = self.clock().now();
        let mut upcoming = self.collect_where(|event| event.start >= now);
        upcoming.sort_by_key(|event| event.start);
        upcoming.truncate(limit);
        upcoming
    }

    /// Month grid for `cursor` annotated with this manager's events.
    pub fn month_grid(&self, cursor: CalendarCursor) -> MonthGrid {
        build_month_grid(cursor, self.clock().today(), |date| {
            self.events_on_date(date)
        })
    }
}
