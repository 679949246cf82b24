//! Core domain logic for MindScribe.
//! This crate owns record invariants, persistence and calendar math; the
//! CLI only renders what it returns.

pub mod calendar;
pub mod clock;
pub mod config;
pub mod datetime;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod persistence;
pub mod repo;
pub mod service;
pub mod text;

pub use calendar::{build_month_grid, CalendarCursor, DayCell, MonthGrid, GRID_CELLS};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{
    AppConfig, ConfigError, ConfigResult, LoggingConfig, StorageConfig, DEFAULT_DB_FILE,
};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use rusqlite::Connection;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::bookmark::{Bookmark, BookmarkDraft, BookmarkPatch, BookmarkSortField};
pub use model::event::{Event, EventDraft, EventPatch, EventSortField};
pub use model::note::{Note, NoteCategory, NoteDraft, NotePatch, NoteSortField};
pub use model::task::{Priority, Task, TaskDraft, TaskPatch, TaskSortField};
pub use model::{Entity, EntityId, ParseValueError, ValidationError};
pub use notify::{EventBus, HandlerError, HandlerResult, PublishReport, SubscriptionId};
pub use persistence::{CollectionKey, Storage, DEFAULT_PREFIX};
pub use repo::kv_repo::{
    KvRepository, MemoryKvRepository, RepoError, RepoResult, SqliteKvRepository,
};
pub use service::bookmark_service::BookmarkManager;
pub use service::dashboard::DashboardSummary;
pub use service::entity_manager::{
    ChangeEvent, ChangeKind, EntityManager, ManagerError, ManagerResult,
};
pub use service::event_service::EventManager;
pub use service::note_service::NoteManager;
pub use service::task_service::TaskManager;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
