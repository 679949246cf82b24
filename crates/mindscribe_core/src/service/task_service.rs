//! Task-specific queries on top of the generic manager.
//!
//! # Invariants
//! - Time-relative views read "now" and local day boundaries from the
//!   manager's clock at call time.
//! - Completed tasks never appear in `overdue` or `due_today`.

use crate::clock::Clock;
use crate::model::task::{Priority, Task, TaskPatch};
use crate::model::EntityId;
use crate::repo::kv_repo::KvRepository;
use crate::service::entity_manager::{EntityManager, ManagerError, ManagerResult};

pub type TaskManager<R, C> = EntityManager<Task, R, C>;

impl<R: KvRepository, C: Clock> EntityManager<Task, R, C> {
    pub fn pending(&self) -> Vec<Task> {
        self.collect_where(|task| !task.completed)
    }

    pub fn completed(&self) -> Vec<Task> {
        self.collect_where(|task| task.completed)
    }

    /// Open tasks whose due instant is already in the past.
    pub fn overdue(&self) -> Vec<Task> {
        let now = self.clock().now();
        self.collect_where(|task| task.is_overdue(now))
    }

    /// Open tasks due within today's local calendar day.
    pub fn due_today(&self) -> Vec<Task> {
        let clock = self.clock();
        let (start, end) = clock.local_day_window(clock.today());
        self.collect_where(|task| !task.completed && task.due_date >= start && task.due_date < end)
    }

    pub fn by_priority(&self, priority: Priority) -> Vec<Task> {
        self.collect_where(|task| task.priority == priority)
    }

    /// Flips `completed` for one task.
    pub fn toggle_completion(&mut self, id: &EntityId) -> ManagerResult<Task> {
        let completed = self
            .items()
            .iter()
            .find(|task| &task.id == id)
            .map(|task| task.completed)
            .ok_or_else(|| ManagerError::NotFound(id.clone()))?;

        self.update(
            id,
            TaskPatch {
                completed: Some(!completed),
                ..TaskPatch::default()
            },
        )
    }

    /// Share of completed tasks in `[0.0, 1.0]`; zero for an empty list.
    pub fn completion_rate(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.completed().len() as f64 / self.len() as f64
    }
}
