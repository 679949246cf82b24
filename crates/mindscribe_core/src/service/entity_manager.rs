//! Generic collection manager shared by notes, tasks, events and bookmarks.
//!
//! # Responsibility
//! - Own one ordered in-memory collection and its persisted copy.
//! - Provide CRUD, derived views (search, filter, sort) and change
//!   notifications.
//!
//! # Invariants
//! - Every successful mutation is followed by exactly one whole-collection
//!   save and one notification.
//! - Validation runs on the candidate record before the collection changes.
//! - A failed save keeps the in-memory mutation; the manager turns dirty
//!   until a later save succeeds.
//! - Callers only ever receive copies of records.

use crate::clock::Clock;
use crate::model::{Entity, EntityId, ValidationError};
use crate::notify::{EventBus, HandlerResult, PublishReport, SubscriptionId};
use crate::persistence::Storage;
use crate::repo::kv_repo::KvRepository;
use crate::text::contains_folded;
use log::{debug, error, info};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const MIN_SEARCH_CHARS: usize = 2;
const ALL_FILTER: &str = "All";

pub type ManagerResult<T> = Result<T, ManagerError>;

/// Failure of a manager mutation. The collection is unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerError {
    NotFound(EntityId),
    Validation(ValidationError),
}

impl Display for ManagerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ManagerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<ValidationError> for ManagerError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Notification topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Loaded,
    Created,
    Updated,
    Deleted,
    PersistFailed,
}

/// Notification payload; records are copies.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent<E> {
    Loaded(Vec<E>),
    Created(E),
    Updated(E),
    Deleted(EntityId),
    /// The in-memory collection diverged from storage.
    PersistFailed { key: String },
}

impl<E> ChangeEvent<E> {
    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::Loaded(_) => ChangeKind::Loaded,
            Self::Created(_) => ChangeKind::Created,
            Self::Updated(_) => ChangeKind::Updated,
            Self::Deleted(_) => ChangeKind::Deleted,
            Self::PersistFailed { .. } => ChangeKind::PersistFailed,
        }
    }
}

/// Owner of one record collection.
pub struct EntityManager<E: Entity, R: KvRepository, C: Clock> {
    items: Vec<E>,
    storage: Storage<R>,
    key: String,
    clock: C,
    bus: EventBus<ChangeKind, ChangeEvent<E>>,
    seed_samples: bool,
    dirty: bool,
}

impl<E: Entity, R: KvRepository, C: Clock> EntityManager<E, R, C> {
    /// Creates an empty, not yet loaded manager.
    pub fn new(storage: Storage<R>, clock: C) -> Self {
        let key = storage.key_for(E::COLLECTION);
        Self {
            items: Vec::new(),
            storage,
            key,
            clock,
            bus: EventBus::new(),
            seed_samples: true,
            dirty: false,
        }
    }

    /// Creates a manager and loads its collection immediately.
    pub fn open(storage: Storage<R>, clock: C) -> Self {
        let mut manager = Self::new(storage, clock);
        manager.load();
        manager
    }

    /// Controls whether an empty store is seeded with sample records.
    pub fn with_seed_samples(mut self, seed_samples: bool) -> Self {
        self.seed_samples = seed_samples;
        self
    }

    /// Replaces the in-memory collection with the stored one.
    ///
    /// Missing, empty or undecodable collections are seeded with
    /// [`Entity::samples`] (when enabled) and written back.
    pub fn load(&mut self) {
        self.items = self.storage.load(&self.key, Vec::new());
        if self.items.is_empty() && self.seed_samples {
            self.items = E::samples();
            if !self.items.is_empty() {
                info!(
                    "event=collection_seed module=entity_manager status=ok kind={} count={}",
                    E::KIND,
                    self.items.len()
                );
                self.persist();
            }
        }
        debug!(
            "event=collection_load module=entity_manager status=ok kind={} count={}",
            E::KIND,
            self.items.len()
        );
        self.publish(ChangeEvent::Loaded(self.items.clone()));
    }

    /// Validates and inserts a new record at the front of the collection.
    pub fn create(&mut self, draft: E::Draft) -> ManagerResult<E> {
        let record = E::from_draft(EntityId::generate(), draft, self.clock.now());
        record.validate()?;

        self.items.insert(0, record.clone());
        self.persist();
        info!(
            "event=entity_create module=entity_manager status=ok kind={} id={}",
            E::KIND,
            record.id()
        );
        self.publish(ChangeEvent::Created(record.clone()));
        Ok(record)
    }

    /// Merges `patch` into the record `id`.
    ///
    /// Present patch fields win; the modification timestamp is refreshed.
    pub fn update(&mut self, id: &EntityId, patch: E::Patch) -> ManagerResult<E> {
        let index = self
            .position(id)
            .ok_or_else(|| ManagerError::NotFound(id.clone()))?;

        let mut candidate = self.items[index].clone();
        candidate.apply_patch(patch);
        candidate.touch(self.clock.now());
        candidate.validate()?;

        self.items[index] = candidate.clone();
        self.persist();
        info!(
            "event=entity_update module=entity_manager status=ok kind={} id={id}",
            E::KIND
        );
        self.publish(ChangeEvent::Updated(candidate.clone()));
        Ok(candidate)
    }

    /// Removes the record `id`. Returns `false` when it did not exist.
    pub fn delete(&mut self, id: &EntityId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        self.items.remove(index);
        self.persist();
        info!(
            "event=entity_delete module=entity_manager status=ok kind={} id={id}",
            E::KIND
        );
        self.publish(ChangeEvent::Deleted(id.clone()));
        true
    }

    pub fn get_by_id(&self, id: &EntityId) -> Option<E> {
        self.items.iter().find(|item| item.id() == id).cloned()
    }

    /// Snapshot of the whole collection in stored order.
    pub fn get_all(&self) -> Vec<E> {
        self.items.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Case-insensitive substring search over title, body, category and tags.
    ///
    /// Queries shorter than two characters (after trimming) match everything.
    pub fn search(&self, query: &str) -> Vec<E> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_CHARS {
            return self.get_all();
        }

        let needle = query.to_lowercase();
        self.collect_where(|item| {
            contains_folded(item.title(), &needle)
                || item
                    .body_fields()
                    .into_iter()
                    .any(|field| contains_folded(field, &needle))
                || item
                    .category()
                    .is_some_and(|category| contains_folded(category, &needle))
                || item.tags().iter().any(|tag| contains_folded(tag, &needle))
        })
    }

    /// Records whose category equals `category`, ignoring case.
    ///
    /// `None`, blank or `"All"` returns the whole collection.
    pub fn filter_by_category(&self, category: Option<&str>) -> Vec<E> {
        match normalize_filter(category) {
            None => self.get_all(),
            Some(wanted) => self.collect_where(|item| {
                item.category()
                    .is_some_and(|category| category.to_lowercase() == wanted)
            }),
        }
    }

    /// Records carrying `tag`, ignoring case. `None` or blank returns all.
    pub fn filter_by_tag(&self, tag: Option<&str>) -> Vec<E> {
        match normalize_filter(tag) {
            None => self.get_all(),
            Some(wanted) => self.collect_where(|item| {
                item.tags().iter().any(|tag| tag.to_lowercase() == wanted)
            }),
        }
    }

    /// Sorted copy of the collection. Ties keep their stored order in both
    /// directions.
    pub fn sort(&self, field: E::SortField, ascending: bool) -> Vec<E> {
        let mut sorted = self.get_all();
        // `sort_by` is stable; reversing the comparator keeps ties in place.
        sorted.sort_by(|left, right| {
            let ordering = left.sort_key(field).cmp(&right.sort_key(field));
            if ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
        sorted
    }

    /// Distinct tags across the collection, sorted.
    pub fn all_tags(&self) -> Vec<String> {
        self.items
            .iter()
            .flat_map(|item| item.tags().iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct categories in use, sorted.
    pub fn all_categories(&self) -> Vec<String> {
        self.items
            .iter()
            .filter_map(|item| item.category().map(str::to_string))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn subscribe<F>(&mut self, kind: ChangeKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&ChangeEvent<E>) -> HandlerResult + 'static,
    {
        self.bus.subscribe(kind, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Whether the last save failed and storage lags behind memory.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Retries saving the collection. Returns `true` once storage is in sync.
    pub fn flush(&mut self) -> bool {
        self.persist();
        !self.dirty
    }

    pub fn storage(&self) -> &Storage<R> {
        &self.storage
    }

    pub(crate) fn clock(&self) -> &C {
        &self.clock
    }

    pub(crate) fn items(&self) -> &[E] {
        &self.items
    }

    pub(crate) fn collect_where(&self, predicate: impl Fn(&E) -> bool) -> Vec<E> {
        self.items
            .iter()
            .filter(|item| predicate(item))
            .cloned()
            .collect()
    }

    fn position(&self, id: &EntityId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    fn persist(&mut self) {
        if self.storage.save(&self.key, &self.items) {
            self.dirty = false;
            return;
        }

        self.dirty = true;
        error!(
            "event=collection_save module=entity_manager status=error kind={} key={} error_code=storage_diverged",
            E::KIND,
            self.key
        );
        self.publish(ChangeEvent::PersistFailed {
            key: self.key.clone(),
        });
    }

    fn publish(&mut self, event: ChangeEvent<E>) -> PublishReport {
        self.bus.publish(event.kind(), &event)
    }
}

fn normalize_filter(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_FILTER) {
        return None;
    }
    Some(trimmed.to_lowercase())
}
