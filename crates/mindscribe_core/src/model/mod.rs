//! Domain model for notes, tasks, events and bookmarks.
//!
//! # Responsibility
//! - Define the persisted record shapes and their update patches.
//! - Describe, through [`Entity`], what the generic manager needs to know
//!   about each record type.
//!
//! # Invariants
//! - Every record carries an immutable [`EntityId`].
//! - Records are validated before they enter a collection.

pub mod bookmark;
pub mod event;
pub mod note;
pub mod task;

use crate::persistence::CollectionKey;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque, immutable record identifier.
///
/// Generated ids are UUID v4 strings; bundled sample data keeps short
/// fixed ids such as `note1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Returns a fresh, never-before-issued id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Rejected record state, reported before any mutation happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyTitle,
    EventEndsBeforeStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    EmptyUrl,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::EventEndsBeforeStart { start, end } => write!(
                f,
                "end time ({}) must not be before start time ({})",
                end.to_rfc3339(),
                start.to_rfc3339()
            ),
            Self::EmptyUrl => write!(f, "bookmark url must not be empty"),
        }
    }
}

impl Error for ValidationError {}

/// Failure to parse a user-facing enum value such as a priority name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseValueError {
    pub kind: &'static str,
    pub value: String,
}

impl Display for ParseValueError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {} `{}`", self.kind, self.value)
    }
}

impl Error for ParseValueError {}

/// Comparable projection of one record field used for sorting.
///
/// Keys produced for the same field always share a variant. Text orders
/// case-insensitively first, so `apple` < `Banana` < `zebra`; spellings
/// that differ only in case fall back to byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey<'a> {
    /// Epoch milliseconds.
    Instant(i64),
    /// Fixed ordinal rank, e.g. priority.
    Rank(u8),
    Flag(bool),
    Text(&'a str),
}

impl SortKey<'_> {
    pub fn instant(value: DateTime<Utc>) -> Self {
        SortKey::Instant(value.timestamp_millis())
    }

    fn variant_rank(&self) -> u8 {
        match self {
            Self::Instant(_) => 0,
            Self::Rank(_) => 1,
            Self::Flag(_) => 2,
            Self::Text(_) => 3,
        }
    }
}

impl Ord for SortKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Instant(left), Self::Instant(right)) => left.cmp(right),
            (Self::Rank(left), Self::Rank(right)) => left.cmp(right),
            (Self::Flag(left), Self::Flag(right)) => left.cmp(right),
            (Self::Text(left), Self::Text(right)) => fold_case(left)
                .cmp(fold_case(right))
                .then_with(|| left.cmp(right)),
            _ => self.variant_rank().cmp(&other.variant_rank()),
        }
    }
}

impl PartialOrd for SortKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn fold_case(value: &str) -> impl Iterator<Item = char> + '_ {
    value.chars().flat_map(char::to_lowercase)
}

/// Record type managed by [`crate::service::entity_manager::EntityManager`].
pub trait Entity: Clone + Serialize + DeserializeOwned {
    /// Creation input; absent fields receive defaults.
    type Draft;
    /// Partial update; present fields overwrite.
    type Patch;
    /// Sortable field selector.
    type SortField: Copy;

    /// Collection this record type persists into.
    const COLLECTION: CollectionKey;
    /// Lowercase name used in log events.
    const KIND: &'static str;

    fn id(&self) -> &EntityId;

    /// Builds a new record, filling defaults for absent draft fields.
    fn from_draft(id: EntityId, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    fn apply_patch(&mut self, patch: Self::Patch);

    /// Refreshes the modification timestamp, if the record carries one.
    fn touch(&mut self, now: DateTime<Utc>);

    fn validate(&self) -> Result<(), ValidationError>;

    fn title(&self) -> &str;

    fn category(&self) -> Option<&str> {
        None
    }

    fn tags(&self) -> &[String] {
        &[]
    }

    /// Free-text fields matched by search, besides title, category and tags.
    fn body_fields(&self) -> Vec<&str> {
        Vec::new()
    }

    fn sort_key(&self, field: Self::SortField) -> SortKey<'_>;

    /// Seed data written when the stored collection is empty.
    fn samples() -> Vec<Self> {
        Vec::new()
    }
}

/// Parses an RFC 3339 literal used by bundled sample data.
pub(crate) fn sample_instant(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .unwrap_or_default()
}

pub(crate) fn require_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}
