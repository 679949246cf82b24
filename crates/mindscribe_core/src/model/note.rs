//! Note records.
//!
//! # Invariants
//! - `updated_at >= created_at`.
//! - `tags` holds no blanks and no case-insensitive duplicates.

use super::{
    require_title, sample_instant, Entity, EntityId, ParseValueError, SortKey, ValidationError,
};
use crate::persistence::CollectionKey;
use crate::text::normalize_tags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const DEFAULT_NOTE_TITLE: &str = "Untitled Note";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NoteCategory {
    Research,
    Meeting,
    #[default]
    Personal,
    Project,
    Idea,
}

impl NoteCategory {
    pub const ALL: [NoteCategory; 5] = [
        Self::Research,
        Self::Meeting,
        Self::Personal,
        Self::Project,
        Self::Idea,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Research => "Research",
            Self::Meeting => "Meeting",
            Self::Personal => "Personal",
            Self::Project => "Project",
            Self::Idea => "Idea",
        }
    }
}

impl Display for NoteCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteCategory {
    type Err = ParseValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ParseValueError {
                kind: "note category",
                value: value.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: EntityId,
    pub title: String,
    pub category: NoteCategory,
    /// Markdown source.
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: Option<String>,
    pub category: Option<NoteCategory>,
    pub content: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub category: Option<NoteCategory>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteSortField {
    Title,
    Category,
    CreatedAt,
    UpdatedAt,
}

impl FromStr for NoteSortField {
    type Err = ParseValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "title" => Ok(Self::Title),
            "category" => Ok(Self::Category),
            "createdAt" | "created" => Ok(Self::CreatedAt),
            "updatedAt" | "updated" => Ok(Self::UpdatedAt),
            other => Err(ParseValueError {
                kind: "note sort field",
                value: other.to_string(),
            }),
        }
    }
}

impl Entity for Note {
    type Draft = NoteDraft;
    type Patch = NotePatch;
    type SortField = NoteSortField;

    const COLLECTION: CollectionKey = CollectionKey::Notes;
    const KIND: &'static str = "note";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn from_draft(id: EntityId, draft: NoteDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title.unwrap_or_else(|| DEFAULT_NOTE_TITLE.to_string()),
            category: draft.category.unwrap_or_default(),
            content: draft.content.unwrap_or_default(),
            tags: normalize_tags(draft.tags),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: NotePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(tags) = patch.tags {
            self.tags = normalize_tags(tags);
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_title(&self.title)
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn category(&self) -> Option<&str> {
        Some(self.category.as_str())
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn body_fields(&self) -> Vec<&str> {
        vec![self.content.as_str()]
    }

    fn sort_key(&self, field: NoteSortField) -> SortKey<'_> {
        match field {
            NoteSortField::Title => SortKey::Text(&self.title),
            NoteSortField::Category => SortKey::Text(self.category.as_str()),
            NoteSortField::CreatedAt => SortKey::instant(self.created_at),
            NoteSortField::UpdatedAt => SortKey::instant(self.updated_at),
        }
    }

    fn samples() -> Vec<Self> {
        vec![
            sample_note(
                "note1",
                "Web Development Trends 2024",
                NoteCategory::Research,
                "Exploration of emerging frameworks, tools, and methodologies that will shape frontend development in the coming year. Key trends include:\n\n- **AI-assisted coding** becoming mainstream\n- Increased adoption of **WebAssembly**\n- **Edge computing** for web applications\n- **Micro-frontends** architecture gaining popularity\n- **Server components** in React and other frameworks",
                &["Tech", "Trends"],
                ("2023-11-14T10:30:00Z", "2023-11-14T14:45:00Z"),
            ),
            sample_note(
                "note2",
                "Q2 Marketing Strategy",
                NoteCategory::Meeting,
                "Notes from the leadership meeting discussing marketing initiatives, budget allocations, and campaign timelines.\n\n# Key Decisions\n\n1. Increase social media budget by 15%\n2. Launch new product line in May\n3. Redesign website homepage\n4. Partner with influencers in our industry\n\n# Action Items\n\n- Sarah to prepare social media calendar\n- John to finalize product launch materials\n- Team to review website mockups by Friday",
                &["Marketing"],
                ("2023-11-12T09:00:00Z", "2023-11-13T11:20:00Z"),
            ),
            sample_note(
                "note3",
                "Book Club Reading List",
                NoteCategory::Personal,
                "Curated selection of novels for monthly book club meetings with ratings and discussion points for each title.\n\n## January\n*The Midnight Library* by Matt Haig\n\n## February\n*Project Hail Mary* by Andy Weir\n\n## March\n*Klara and the Sun* by Kazuo Ishiguro\n\n## April\n*The Lincoln Highway* by Amor Towles",
                &["Reading"],
                ("2023-11-09T16:15:00Z", "2023-11-09T16:15:00Z"),
            ),
            sample_note(
                "note4",
                "Mobile App UI Design System",
                NoteCategory::Project,
                "Complete UI documentation for the company's flagship mobile application covering colors, typography and components.\n\n### Color Palette\n- Primary: #3B82F6\n- Secondary: #8B5CF6\n- Accent: #10B981\n- Background: #F9FAFB\n- Text: #1F2937\n\n### Typography\n- Headings: Inter Bold\n- Body: Inter Regular\n- Buttons: Inter Medium",
                &["Design", "UI"],
                ("2023-11-11T13:45:00Z", "2023-11-11T13:45:00Z"),
            ),
        ]
    }
}

fn sample_note(
    id: &str,
    title: &str,
    category: NoteCategory,
    content: &str,
    tags: &[&str],
    (created_at, updated_at): (&str, &str),
) -> Note {
    Note {
        id: EntityId::from(id),
        title: title.to_string(),
        category,
        content: content.to_string(),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        created_at: sample_instant(created_at),
        updated_at: sample_instant(updated_at),
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, NoteCategory, NoteDraft, NotePatch};
    use crate::model::{Entity, EntityId, ValidationError};
    use chrono::{TimeZone, Utc};

    #[test]
    fn draft_defaults_fill_absent_fields() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let note = Note::from_draft(EntityId::from("n"), NoteDraft::default(), now);

        assert_eq!(note.title, "Untitled Note");
        assert_eq!(note.category, NoteCategory::Personal);
        assert!(note.content.is_empty());
        assert!(note.tags.is_empty());
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn patch_overwrites_only_present_fields() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let mut note = Note::from_draft(
            EntityId::from("n"),
            NoteDraft {
                title: Some("Plan".to_string()),
                content: Some("body".to_string()),
                ..NoteDraft::default()
            },
            now,
        );

        note.apply_patch(NotePatch {
            category: Some(NoteCategory::Idea),
            ..NotePatch::default()
        });

        assert_eq!(note.title, "Plan");
        assert_eq!(note.content, "body");
        assert_eq!(note.category, NoteCategory::Idea);
    }

    #[test]
    fn touch_never_moves_updated_before_created() {
        let created = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let mut note = Note::from_draft(EntityId::from("n"), NoteDraft::default(), created);

        note.touch(created - chrono::Duration::hours(1));
        assert_eq!(note.updated_at, created);

        note.touch(created + chrono::Duration::hours(1));
        assert!(note.updated_at > note.created_at);
    }

    #[test]
    fn blank_title_fails_validation() {
        let now = Utc::now();
        let note = Note::from_draft(
            EntityId::from("n"),
            NoteDraft {
                title: Some("   ".to_string()),
                ..NoteDraft::default()
            },
            now,
        );
        assert_eq!(note.validate(), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn serialized_note_uses_camel_case_fields() {
        let note = Note::samples().remove(0);
        let json = serde_json::to_value(&note).unwrap();

        assert_eq!(json["id"], "note1");
        assert_eq!(json["category"], "Research");
        assert_eq!(json["createdAt"], "2023-11-14T10:30:00Z");
        assert_eq!(json["tags"][1], "Trends");
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("meeting".parse::<NoteCategory>(), Ok(NoteCategory::Meeting));
        assert!("Work".parse::<NoteCategory>().is_err());
    }
}
