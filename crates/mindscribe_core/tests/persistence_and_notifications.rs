use chrono::{TimeZone, Utc};
use mindscribe_core::{
    ChangeEvent, ChangeKind, CollectionKey, FixedClock, KvRepository, MemoryKvRepository, Note,
    NoteDraft, NoteManager, Storage, TaskManager,
};
use std::cell::RefCell;
use std::rc::Rc;

fn clock() -> FixedClock {
    FixedClock::at(Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap())
}

#[test]
fn save_then_load_round_trips_collection() {
    let repo = MemoryKvRepository::new();
    let mut notes = NoteManager::open(Storage::new(&repo), clock());
    notes
        .create(NoteDraft {
            title: Some("Keep me".to_string()),
            tags: vec!["one".to_string()],
            ..NoteDraft::default()
        })
        .unwrap();

    let storage = Storage::new(&repo);
    let stored: Vec<Note> = storage.load(&storage.key_for(CollectionKey::Notes), Vec::new());
    assert_eq!(stored, notes.get_all());
}

#[test]
fn corrupted_collection_falls_back_to_samples() {
    let repo = MemoryKvRepository::new();
    repo.insert_raw("mindscribe_tasks", "[{\"id\": 42");

    let tasks = TaskManager::open(Storage::new(&repo), clock());
    assert_eq!(tasks.len(), 3);
    let repaired = repo.get("mindscribe_tasks").unwrap().unwrap();
    assert!(repaired.starts_with('['));
    assert!(repaired.contains("task1"));
}

#[test]
fn failed_save_keeps_mutation_and_marks_manager_dirty() {
    let repo = MemoryKvRepository::with_quota(64);
    let mut notes = NoteManager::new(Storage::new(&repo), clock()).with_seed_samples(false);
    notes.load();

    let failures = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&failures);
    notes.subscribe(ChangeKind::PersistFailed, move |event| {
        if let ChangeEvent::PersistFailed { key } = event {
            sink.borrow_mut().push(key.clone());
        }
        Ok(())
    });

    let created = notes
        .create(NoteDraft {
            title: Some("x".repeat(200)),
            ..NoteDraft::default()
        })
        .unwrap();

    assert!(notes.is_dirty());
    assert_eq!(notes.get_by_id(&created.id), Some(created.clone()));
    assert_eq!(*failures.borrow(), vec!["mindscribe_notes".to_string()]);
    assert!(repo.get("mindscribe_notes").unwrap().is_none());

    // Still too large; flushing again fails.
    assert!(!notes.flush());

    assert!(notes.delete(&created.id));
    assert!(!notes.is_dirty());
    assert!(notes.flush());
    assert_eq!(repo.get("mindscribe_notes").unwrap().as_deref(), Some("[]"));
}

#[test]
fn subscribers_run_in_order_and_survive_failing_handlers() {
    let repo = MemoryKvRepository::new();
    let mut notes = NoteManager::new(Storage::new(&repo), clock()).with_seed_samples(false);
    let log = Rc::new(RefCell::new(Vec::new()));

    let first = Rc::clone(&log);
    notes.subscribe(ChangeKind::Created, move |_| {
        first.borrow_mut().push("first");
        Err("render failed".into())
    });
    let second = Rc::clone(&log);
    notes.subscribe(ChangeKind::Created, move |_| {
        second.borrow_mut().push("second");
        panic!("handler bug");
    });
    let third = Rc::clone(&log);
    let third_id = notes.subscribe(ChangeKind::Created, move |event| {
        assert!(matches!(event, ChangeEvent::Created(_)));
        third.borrow_mut().push("third");
        Ok(())
    });
    let deleted = Rc::clone(&log);
    notes.subscribe(ChangeKind::Deleted, move |_| {
        deleted.borrow_mut().push("deleted");
        Ok(())
    });

    let note = notes.create(NoteDraft::default()).unwrap();
    assert_eq!(*log.borrow(), vec!["first", "second", "third"]);

    assert!(notes.unsubscribe(third_id));
    assert!(!notes.unsubscribe(third_id));
    log.borrow_mut().clear();

    notes.create(NoteDraft::default()).unwrap();
    assert!(notes.delete(&note.id));
    assert_eq!(*log.borrow(), vec!["first", "second", "deleted"]);
}

#[test]
fn load_publishes_loaded_snapshot() {
    let repo = MemoryKvRepository::new();
    let mut tasks = TaskManager::new(Storage::new(&repo), clock());
    let seen = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&seen);
    tasks.subscribe(ChangeKind::Loaded, move |event| {
        if let ChangeEvent::Loaded(items) = event {
            *sink.borrow_mut() = items.len();
        }
        Ok(())
    });

    tasks.load();
    assert_eq!(*seen.borrow(), 3);
}

#[test]
fn clear_all_leaves_foreign_keys_and_usage_counts_prefix_only() {
    let repo = MemoryKvRepository::new();
    repo.insert_raw("other_app_state", "abcd");
    let _notes = NoteManager::open(Storage::new(&repo), clock());
    let _tasks = TaskManager::open(Storage::new(&repo), clock());

    let storage = Storage::new(&repo);
    let usage = storage.usage();
    let expected: u64 = ["mindscribe_notes", "mindscribe_tasks"]
        .iter()
        .map(|key| repo.get(key).unwrap().unwrap().encode_utf16().count() as u64 * 2)
        .sum();
    assert_eq!(usage, expected);
    assert!(storage.usage_megabytes() > 0.0);

    assert!(storage.clear_all());
    assert_eq!(storage.usage(), 0);
    assert_eq!(repo.len(), 1);
    assert_eq!(repo.get("other_app_state").unwrap().as_deref(), Some("abcd"));
}
