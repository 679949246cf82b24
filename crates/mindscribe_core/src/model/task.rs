//! Task records.
//!
//! # Invariants
//! - `updated_at >= created_at`.
//! - `completed` can flip independently of every other field.

use super::{
    require_title, sample_instant, Entity, EntityId, ParseValueError, SortKey, ValidationError,
};
use crate::persistence::CollectionKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const DEFAULT_TASK_TITLE: &str = "Untitled Task";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Self::Low, Self::Medium, Self::High];

    /// Fixed ordering rank: Low=1, Medium=2, High=3.
    pub fn rank(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ParseValueError {
                kind: "priority",
                value: value.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: EntityId,
    pub title: String,
    pub due_date: DateTime<Utc>,
    pub priority: Priority,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: Option<String>,
    /// Defaults to the creation instant.
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSortField {
    Title,
    DueDate,
    Priority,
    Completed,
    CreatedAt,
    UpdatedAt,
}

impl FromStr for TaskSortField {
    type Err = ParseValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "title" => Ok(Self::Title),
            "dueDate" | "due" => Ok(Self::DueDate),
            "priority" => Ok(Self::Priority),
            "completed" => Ok(Self::Completed),
            "createdAt" | "created" => Ok(Self::CreatedAt),
            "updatedAt" | "updated" => Ok(Self::UpdatedAt),
            other => Err(ParseValueError {
                kind: "task sort field",
                value: other.to_string(),
            }),
        }
    }
}

impl Task {
    /// Whether the task is still open and its due instant has passed.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due_date < now
    }
}

impl Entity for Task {
    type Draft = TaskDraft;
    type Patch = TaskPatch;
    type SortField = TaskSortField;

    const COLLECTION: CollectionKey = CollectionKey::Tasks;
    const KIND: &'static str = "task";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn from_draft(id: EntityId, draft: TaskDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title.unwrap_or_else(|| DEFAULT_TASK_TITLE.to_string()),
            due_date: draft.due_date.unwrap_or(now),
            priority: draft.priority.unwrap_or_default(),
            completed: draft.completed,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
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

    fn sort_key(&self, field: TaskSortField) -> SortKey<'_> {
        match field {
            TaskSortField::Title => SortKey::Text(&self.title),
            TaskSortField::DueDate => SortKey::instant(self.due_date),
            TaskSortField::Priority => SortKey::Rank(self.priority.rank()),
            TaskSortField::Completed => SortKey::Flag(self.completed),
            TaskSortField::CreatedAt => SortKey::instant(self.created_at),
            TaskSortField::UpdatedAt => SortKey::instant(self.updated_at),
        }
    }

    fn samples() -> Vec<Self> {
        vec![
            sample_task(
                "task1",
                "Complete research for client proposal",
                "2023-11-14T16:00:00Z",
                Priority::High,
                false,
                ("2023-11-13T09:30:00Z", "2023-11-13T09:30:00Z"),
            ),
            sample_task(
                "task2",
                "Schedule team meeting for Q2 planning",
                "2023-11-15T12:00:00Z",
                Priority::Medium,
                false,
                ("2023-11-13T10:15:00Z", "2023-11-13T10:15:00Z"),
            ),
            sample_task(
                "task3",
                "Update expense reports",
                "2023-11-13T17:00:00Z",
                Priority::Low,
                true,
                ("2023-11-12T14:00:00Z", "2023-11-13T11:30:00Z"),
            ),
        ]
    }
}

fn sample_task(
    id: &str,
    title: &str,
    due_date: &str,
    priority: Priority,
    completed: bool,
    (created_at, updated_at): (&str, &str),
) -> Task {
    Task {
        id: EntityId::from(id),
        title: title.to_string(),
        due_date: sample_instant(due_date),
        priority,
        completed,
        created_at: sample_instant(created_at),
        updated_at: sample_instant(updated_at),
    }
}
