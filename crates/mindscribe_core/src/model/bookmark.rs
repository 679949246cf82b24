//! Bookmark records: saved links with a category and tags.

use super::{require_title, Entity, EntityId, ParseValueError, SortKey, ValidationError};
use crate::persistence::CollectionKey;
use crate::text::normalize_tags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_BOOKMARK_CATEGORY: &str = "General";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: EntityId,
    pub title: String,
    pub url: String,
    pub category: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkDraft {
    /// Defaults to the url.
    pub title: Option<String>,
    pub url: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkPatch {
    pub title: Option<String>,
    pub url: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkSortField {
    Title,
    Url,
    Category,
    CreatedAt,
    UpdatedAt,
}

impl FromStr for BookmarkSortField {
    type Err = ParseValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "title" => Ok(Self::Title),
            "url" => Ok(Self::Url),
            "category" => Ok(Self::Category),
            "createdAt" | "created" => Ok(Self::CreatedAt),
            "updatedAt" | "updated" => Ok(Self::UpdatedAt),
            other => Err(ParseValueError {
                kind: "bookmark sort field",
                value: other.to_string(),
            }),
        }
    }
}

impl Entity for Bookmark {
    type Draft = BookmarkDraft;
    type Patch = BookmarkPatch;
    type SortField = BookmarkSortField;

    const COLLECTION: CollectionKey = CollectionKey::Bookmarks;
    const KIND: &'static str = "bookmark";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn from_draft(id: EntityId, draft: BookmarkDraft, now: DateTime<Utc>) -> Self {
        let url = draft.url.trim().to_string();
        Self {
            id,
            title: draft.title.unwrap_or_else(|| url.clone()),
            url,
            category: draft
                .category
                .unwrap_or_else(|| DEFAULT_BOOKMARK_CATEGORY.to_string()),
            tags: normalize_tags(draft.tags),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: BookmarkPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(url) = patch.url {
            self.url = url.trim().to_string();
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(tags) = patch.tags {
            self.tags = normalize_tags(tags);
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        require_title(&self.title)
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn body_fields(&self) -> Vec<&str> {
        vec![self.url.as_str()]
    }

    fn sort_key(&self, field: BookmarkSortField) -> SortKey<'_> {
        match field {
            BookmarkSortField::Title => SortKey::Text(&self.title),
            BookmarkSortField::Url => SortKey::Text(&self.url),
            BookmarkSortField::Category => SortKey::Text(&self.category),
            BookmarkSortField::CreatedAt => SortKey::instant(self.created_at),
            BookmarkSortField::UpdatedAt => SortKey::instant(self.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Bookmark, BookmarkDraft};
    use crate::model::{Entity, EntityId, ValidationError};
    use chrono::Utc;

    #[test]
    fn title_defaults_to_trimmed_url() {
        let bookmark = Bookmark::from_draft(
            EntityId::from("b"),
            BookmarkDraft {
                url: " https://www.rust-lang.org ".to_string(),
                ..BookmarkDraft::default()
            },
            Utc::now(),
        );
        assert_eq!(bookmark.title, "https://www.rust-lang.org");
        assert_eq!(bookmark.category, "General");
    }

    #[test]
    fn blank_url_fails_validation() {
        let bookmark = Bookmark::from_draft(
            EntityId::from("b"),
            BookmarkDraft {
                title: Some("Nothing".to_string()),
                url: "   ".to_string(),
                ..BookmarkDraft::default()
            },
            Utc::now(),
        );
        assert_eq!(bookmark.validate(), Err(ValidationError::EmptyUrl));
    }
}
