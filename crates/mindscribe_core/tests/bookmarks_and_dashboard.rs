use chrono::{TimeZone, Utc};
use mindscribe_core::{
    BookmarkDraft, BookmarkManager, BookmarkPatch, DashboardSummary, EventManager, FixedClock,
    ManagerError, MemoryKvRepository, NoteManager, Storage, TaskManager, ValidationError,
};

fn clock() -> FixedClock {
    FixedClock::at(Utc.with_ymd_and_hms(2023, 11, 14, 12, 0, 0).unwrap())
}

fn link(url: &str, tags: &[&str]) -> BookmarkDraft {
    BookmarkDraft {
        url: url.to_string(),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        ..BookmarkDraft::default()
    }
}

#[test]
fn bookmarks_start_empty_and_default_title_to_url() {
    let repo = MemoryKvRepository::new();
    let mut bookmarks = BookmarkManager::open(Storage::new(&repo), clock());
    assert!(bookmarks.is_empty());

    let created = bookmarks
        .create(link("  https://docs.rs/chrono  ", &["rust"]))
        .unwrap();
    assert_eq!(created.url, "https://docs.rs/chrono");
    assert_eq!(created.title, "https://docs.rs/chrono");
    assert_eq!(created.category, "General");
}

#[test]
fn blank_url_is_rejected_on_create_and_update() {
    let repo = MemoryKvRepository::new();
    let mut bookmarks = BookmarkManager::open(Storage::new(&repo), clock());

    let err = bookmarks.create(link("   ", &[])).unwrap_err();
    assert_eq!(err, ManagerError::Validation(ValidationError::EmptyUrl));

    let created = bookmarks.create(link("https://example.com", &[])).unwrap();
    let err = bookmarks
        .update(
            &created.id,
            BookmarkPatch {
                url: Some(String::new()),
                ..BookmarkPatch::default()
            },
        )
        .unwrap_err();
    assert_eq!(err, ManagerError::Validation(ValidationError::EmptyUrl));
    assert_eq!(bookmarks.get_by_id(&created.id), Some(created));
}

#[test]
fn bookmarks_search_url_and_group_by_host() {
    let repo = MemoryKvRepository::new();
    let mut bookmarks = BookmarkManager::open(Storage::new(&repo), clock());
    bookmarks
        .create(link("https://www.rust-lang.org/learn", &["Docs"]))
        .unwrap();
    bookmarks
        .create(link("https://rust-lang.org/tools", &["docs", "Tools"]))
        .unwrap();
    bookmarks.create(link("https://crates.io", &[])).unwrap();

    assert_eq!(bookmarks.search("crates").len(), 1);
    assert_eq!(bookmarks.by_host("RUST-LANG.org").len(), 2);
    assert_eq!(
        bookmarks.all_tags(),
        vec!["Docs".to_string(), "Tools".to_string(), "docs".to_string()]
    );
    assert_eq!(bookmarks.filter_by_tag(Some("DOCS")).len(), 2);
}

#[test]
fn dashboard_counts_seeded_collections() {
    let repo = MemoryKvRepository::new();
    let notes = NoteManager::open(Storage::new(&repo), clock());
    let tasks = TaskManager::open(Storage::new(&repo), clock());
    let events = EventManager::open(Storage::new(&repo), clock());
    let bookmarks = BookmarkManager::open(Storage::new(&repo), clock());

    let summary = DashboardSummary::collect(&notes, &tasks, &events, &bookmarks);
    assert_eq!(summary.notes, 4);
    assert_eq!(summary.tasks_total, 3);
    assert_eq!(summary.tasks_pending, 2);
    assert_eq!(summary.tasks_completed, 1);
    assert_eq!(summary.tasks_overdue, 0);
    assert_eq!(summary.tasks_due_today, 1);
    assert_eq!(summary.events_today, 2);
    assert_eq!(summary.bookmarks, 0);
    assert!(summary.storage_bytes > 0);
}
