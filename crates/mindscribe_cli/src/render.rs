//! Plain-text views over manager snapshots.
//!
//! Each view borrows copies of records and implements [`Display`], so it
//! is regenerated from scratch on every command.

use chrono::{DateTime, Local, Utc};
use mindscribe_core::datetime::{format_date, relative_time, DateStyle};
use mindscribe_core::service::note_service::{note_preview, NOTE_PREVIEW_CHARS};
use mindscribe_core::text::truncate;
use mindscribe_core::{
    Bookmark, CalendarCursor, DashboardSummary, Event, MonthGrid, Note, Task,
};
use std::fmt::{self, Display, Formatter};

const WEEKDAY_HEADER: &str = " Su  Mo  Tu  We  Th  Fr  Sa";
const TITLE_WIDTH: usize = 40;

pub fn dashboard(summary: &DashboardSummary) -> impl Display + '_ {
    Dashboard(summary)
}

pub fn note_list<'a>(heading: &'a str, notes: &'a [Note], now: DateTime<Utc>) -> impl Display + 'a {
    NoteList {
        heading,
        notes,
        now,
    }
}

pub fn task_list<'a>(heading: &'a str, tasks: &'a [Task], now: DateTime<Utc>) -> impl Display + 'a {
    TaskList {
        heading,
        tasks,
        now,
    }
}

pub fn event_list<'a>(heading: &'a str, events: &'a [Event]) -> impl Display + 'a {
    EventList { heading, events }
}

pub fn bookmark_list(bookmarks: &[Bookmark]) -> impl Display + '_ {
    BookmarkList(bookmarks)
}

/// Six-row month view. Today is bracketed, days with events get a `*`.
pub fn month_grid<'a>(cursor: &'a CalendarCursor, grid: &'a MonthGrid) -> impl Display + 'a {
    MonthView { cursor, grid }
}

struct Dashboard<'a>(&'a DashboardSummary);

impl Display for Dashboard<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let summary = self.0;
        writeln!(f, "Dashboard")?;
        writeln!(f, "  notes        {}", summary.notes)?;
        writeln!(
            f,
            "  tasks        {} total, {} pending, {} done ({:.0}%)",
            summary.tasks_total,
            summary.tasks_pending,
            summary.tasks_completed,
            summary.completion_rate * 100.0
        )?;
        writeln!(
            f,
            "  attention    {} overdue, {} due today",
            summary.tasks_overdue, summary.tasks_due_today
        )?;
        writeln!(f, "  events today {}", summary.events_today)?;
        writeln!(f, "  bookmarks    {}", summary.bookmarks)?;
        writeln!(f, "  storage      {} bytes", summary.storage_bytes)
    }
}

struct NoteList<'a> {
    heading: &'a str,
    notes: &'a [Note],
    now: DateTime<Utc>,
}

impl Display for NoteList<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_heading(f, self.heading, self.notes.len(), "notes")?;
        for note in self.notes {
            writeln!(
                f,
                "  {}  [{}] {}  · {}",
                note.id,
                note.category.as_str(),
                truncate(&note.title, TITLE_WIDTH, "..."),
                relative_time(note.updated_at, self.now)
            )?;
            let preview = note_preview(note, NOTE_PREVIEW_CHARS);
            if !preview.is_empty() {
                writeln!(f, "      {preview}")?;
            }
            if !note.tags.is_empty() {
                let tags: Vec<String> = note.tags.iter().map(|tag| format!("#{tag}")).collect();
                writeln!(f, "      {}", tags.join(" "))?;
            }
        }
        Ok(())
    }
}

struct TaskList<'a> {
    heading: &'a str,
    tasks: &'a [Task],
    now: DateTime<Utc>,
}

impl Display for TaskList<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_heading(f, self.heading, self.tasks.len(), "tasks")?;
        for task in self.tasks {
            let mark = if task.completed { "x" } else { " " };
            let overdue = if task.is_overdue(self.now) { "  OVERDUE" } else { "" };
            writeln!(
                f,
                "  [{mark}] {}  {:<6} {}  due {}{overdue}",
                task.id,
                task.priority.as_str(),
                truncate(&task.title, TITLE_WIDTH, "..."),
                format_date(&task.due_date.with_timezone(&Local), DateStyle::Medium)
            )?;
        }
        Ok(())
    }
}

struct EventList<'a> {
    heading: &'a str,
    events: &'a [Event],
}

impl Display for EventList<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_heading(f, self.heading, self.events.len(), "events")?;
        for event in self.events {
            writeln!(
                f,
                "  {}  {} - {}  {} ({})",
                event.id,
                format_date(&event.start.with_timezone(&Local), DateStyle::Medium),
                format_date(&event.end.with_timezone(&Local), DateStyle::Time),
                truncate(&event.title, TITLE_WIDTH, "..."),
                event.category
            )?;
        }
        Ok(())
    }
}

struct BookmarkList<'a>(&'a [Bookmark]);

impl Display for BookmarkList<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_heading(f, "Bookmarks", self.0.len(), "bookmarks")?;
        for bookmark in self.0 {
            writeln!(
                f,
                "  {}  [{}] {}\n      {}",
                bookmark.id,
                bookmark.category,
                truncate(&bookmark.title, TITLE_WIDTH, "..."),
                bookmark.url
            )?;
        }
        Ok(())
    }
}

struct MonthView<'a> {
    cursor: &'a CalendarCursor,
    grid: &'a MonthGrid,
}

impl Display for MonthView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:^28}", self.cursor.label())?;
        writeln!(f, "{WEEKDAY_HEADER}")?;
        for week in &self.grid.weeks {
            for cell in week {
                match (cell.is_current_month, cell.is_today) {
                    (false, _) => f.write_str("    ")?,
                    (true, true) => write!(f, "[{:>2}]", cell.day)?,
                    (true, false) => {
                        let marker = if cell.events.is_empty() { ' ' } else { '*' };
                        write!(f, " {:>2}{marker}", cell.day)?;
                    }
                }
            }
            writeln!(f)?;
        }

        for event in self.grid.cells().flat_map(|cell| cell.events.iter()) {
            writeln!(
                f,
                "  {}  {}",
                format_date(&event.start.with_timezone(&Local), DateStyle::Short),
                event.title
            )?;
        }
        Ok(())
    }
}

fn write_heading(f: &mut Formatter<'_>, heading: &str, count: usize, noun: &str) -> fmt::Result {
    writeln!(f, "{heading} ({count})")?;
    if count == 0 {
        writeln!(f, "  (no {noun})")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{dashboard, month_grid, task_list};
    use chrono::{NaiveDate, TimeZone, Utc};
    use mindscribe_core::{
        build_month_grid, CalendarCursor, DashboardSummary, EntityId, Priority, Task,
    };

    #[test]
    fn dashboard_shows_completion_percentage() {
        let summary = DashboardSummary {
            tasks_total: 4,
            tasks_completed: 1,
            tasks_pending: 3,
            completion_rate: 0.25,
            ..DashboardSummary::default()
        };
        let text = dashboard(&summary).to_string();
        assert!(text.contains("4 total, 3 pending, 1 done (25%)"));
    }

    #[test]
    fn task_list_flags_overdue_tasks() {
        let due = Utc.with_ymd_and_hms(2023, 11, 13, 9, 0, 0).unwrap();
        let task = Task {
            id: EntityId::from("task1"),
            title: "Send report".to_string(),
            due_date: due,
            priority: Priority::High,
            completed: false,
            created_at: due,
            updated_at: due,
        };
        let now = Utc.with_ymd_and_hms(2023, 11, 14, 9, 0, 0).unwrap();
        let tasks = [task];
        let text = task_list("Tasks", &tasks, now).to_string();
        assert!(text.starts_with("Tasks (1)\n"));
        assert!(text.contains("OVERDUE"));
    }

    #[test]
    fn empty_task_list_says_so() {
        let now = Utc.with_ymd_and_hms(2023, 11, 14, 9, 0, 0).unwrap();
        let text = task_list("Overdue", &[], now).to_string();
        assert_eq!(text, "Overdue (0)\n  (no tasks)\n");
    }

    #[test]
    fn month_grid_renders_six_week_rows() {
        let cursor = CalendarCursor::new(10, 2023).unwrap();
        let today = NaiveDate::from_ymd_opt(2023, 11, 14).unwrap();
        let grid = build_month_grid(cursor, today, |_| Vec::new());

        let text = month_grid(&cursor, &grid).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].contains("November 2023"));
        assert_eq!(lines.len(), 2 + 6);
        assert!(text.contains("[14]"));
    }
}
