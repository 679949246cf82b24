//! Dashboard counters gathered from every manager.

use crate::clock::Clock;
use crate::model::bookmark::Bookmark;
use crate::model::event::Event;
use crate::model::note::Note;
use crate::model::task::Task;
use crate::repo::kv_repo::KvRepository;
use crate::service::entity_manager::EntityManager;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DashboardSummary {
    pub notes: usize,
    pub tasks_total: usize,
    pub tasks_pending: usize,
    pub tasks_completed: usize,
    pub tasks_overdue: usize,
    pub tasks_due_today: usize,
    pub events_today: usize,
    pub bookmarks: usize,
    pub completion_rate: f64,
    pub storage_bytes: u64,
}

impl DashboardSummary {
    pub fn collect<R: KvRepository, C: Clock>(
        notes: &EntityManager<Note, R, C>,
        tasks: &EntityManager<Task, R, C>,
        events: &EntityManager<Event, R, C>,
        bookmarks: &EntityManager<Bookmark, R, C>,
    ) -> Self {
        Self {
            notes: notes.len(),
            tasks_total: tasks.len(),
            tasks_pending: tasks.pending().len(),
            tasks_completed: tasks.completed().len(),
            tasks_overdue: tasks.overdue().len(),
            tasks_due_today: tasks.due_today().len(),
            events_today: events.events_today().len(),
            bookmarks: bookmarks.len(),
            completion_rate: tasks.completion_rate(),
            storage_bytes: notes.storage().usage(),
        }
    }
}
