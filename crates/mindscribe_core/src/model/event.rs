//! Calendar event records.
//!
//! # Invariants
//! - `end >= start`; checked before an event enters or changes in a
//!   collection.
//! - Events carry no modification timestamp.

use super::{
    require_title, sample_instant, Entity, EntityId, ParseValueError, SortKey, ValidationError,
};
use crate::persistence::CollectionKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_EVENT_TITLE: &str = "Untitled Event";
pub const DEFAULT_EVENT_CATEGORY: &str = "Personal";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EntityId,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub category: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    pub title: Option<String>,
    /// Defaults to the creation instant.
    pub start: Option<DateTime<Utc>>,
    /// Defaults to `start`, giving a zero-length event.
    pub end: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSortField {
    Title,
    Start,
    End,
    Category,
    CreatedAt,
}

impl FromStr for EventSortField {
    type Err = ParseValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "title" => Ok(Self::Title),
            "start" => Ok(Self::Start),
            "end" => Ok(Self::End),
            "category" => Ok(Self::Category),
            "createdAt" | "created" => Ok(Self::CreatedAt),
            other => Err(ParseValueError {
                kind: "event sort field",
                value: other.to_string(),
            }),
        }
    }
}

impl Entity for Event {
    type Draft = EventDraft;
    type Patch = EventPatch;
    type SortField = EventSortField;

    const COLLECTION: CollectionKey = CollectionKey::Events;
    const KIND: &'static str = "event";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn from_draft(id: EntityId, draft: EventDraft, now: DateTime<Utc>) -> Self {
        let start = draft.start.unwrap_or(now);
        Self {
            id,
            title: draft
                .title
                .unwrap_or_else(|| DEFAULT_EVENT_TITLE.to_string()),
            start,
            end: draft.end.unwrap_or(start),
            category: draft
                .category
                .unwrap_or_else(|| DEFAULT_EVENT_CATEGORY.to_string()),
            description: draft.description.unwrap_or_default(),
            created_at: now,
        }
    }

    fn apply_patch(&mut self, patch: EventPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(start) = patch.start {
            self.start = start;
        }
        if let Some(end) = patch.end {
            self.end = end;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
    }

    fn touch(&mut self, _now: DateTime<Utc>) {}

    fn validate(&self) -> Result<(), ValidationError> {
        require_title(&self.title)?;
        if self.end < self.start {
            return Err(ValidationError::EventEndsBeforeStart {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }

    fn body_fields(&self) -> Vec<&str> {
        vec![self.description.as_str()]
    }

    fn sort_key(&self, field: EventSortField) -> SortKey<'_> {
        match field {
            EventSortField::Title => SortKey::Text(&self.title),
            EventSortField::Start => SortKey::instant(self.start),
            EventSortField::End => SortKey::instant(self.end),
            EventSortField::Category => SortKey::Text(&self.category),
            EventSortField::CreatedAt => SortKey::instant(self.created_at),
        }
    }

    fn samples() -> Vec<Self> {
        vec![
            sample_event(
                "event1",
                "Team Meeting",
                ("2023-11-14T14:00:00Z", "2023-11-14T15:30:00Z"),
                "Work",
                "Weekly team sync to discuss project progress and roadblocks.",
                "2023-11-10T09:00:00Z",
            ),
            sample_event(
                "event2",
                "Project Deadline",
                ("2023-11-14T18:00:00Z", "2023-11-14T18:00:00Z"),
                "Work",
                "Final submission deadline for the client project.",
                "2023-11-01T10:30:00Z",
            ),
            sample_event(
                "event3",
                "Dentist Appointment",
                ("2023-11-16T13:00:00Z", "2023-11-16T14:00:00Z"),
                "Personal",
                "Regular checkup at Dr. Smith's office.",
                "2023-11-05T11:15:00Z",
            ),
            sample_event(
                "event4",
                "Birthday Party",
                ("2023-11-18T18:00:00Z", "2023-11-18T22:00:00Z"),
                "Personal",
                "Sarah's birthday celebration at Riverfront Restaurant.",
                "2023-11-02T09:45:00Z",
            ),
        ]
    }
}

fn sample_event(
    id: &str,
    title: &str,
    (start, end): (&str, &str),
    category: &str,
    description: &str,
    created_at: &str,
) -> Event {
    Event {
        id: EntityId::from(id),
        title: title.to_string(),
        start: sample_instant(start),
        end: sample_instant(end),
        category: category.to_string(),
        description: description.to_string(),
        created_at: sample_instant(created_at),
    }
}

#[cfg(test)]
mod tests {
    use super::{Event, EventDraft, EventPatch};
    use crate::model::{Entity, EntityId, ValidationError};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn end_defaults_to_start() {
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
        let start = now + Duration::hours(4);
        let event = Event::from_draft(
            EntityId::from("e"),
            EventDraft {
                start: Some(start),
                ..EventDraft::default()
            },
            now,
        );

        assert_eq!(event.end, start);
        assert_eq!(event.category, "Personal");
        assert!(event.validate().is_ok());
    }

    #[test]
    fn reversed_window_fails_validation() {
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
        let mut event = Event::from_draft(EntityId::from("e"), EventDraft::default(), now);
        event.apply_patch(EventPatch {
            end: Some(now - Duration::minutes(30)),
            ..EventPatch::default()
        });

        assert_eq!(
            event.validate(),
            Err(ValidationError::EventEndsBeforeStart {
                start: now,
                end: now - Duration::minutes(30),
            })
        );
    }
}
