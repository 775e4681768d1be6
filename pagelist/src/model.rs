use crate::{ItemKey, Timestamp};

/// A field searched by the free-text query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextField {
    Title,
    /// Body text: a note's content, a task's description.
    Content,
    Category,
}

/// A field matched exactly by a filter predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilterField {
    Creator,
    Assignee,
    Status,
    Priority,
    Category,
}

/// An entity that can be paged by creation time and shown in a list.
pub trait PagedItem {
    type Key: ItemKey;

    fn key(&self) -> Self::Key;

    fn created_at(&self) -> Timestamp;

    /// Pinned items can be grouped at the front of a list.
    fn is_pinned(&self) -> bool {
        false
    }

    fn text_field(&self, field: TextField) -> Option<&str>;

    fn filter_field(&self, field: FilterField) -> Option<&str>;
}

/// An item that can be created and patched through a [`crate::PagedSource`].
pub trait Editable: PagedItem + Send + Sync + 'static {
    type Draft: Send + 'static;
    type Patch: Send + 'static;

    fn apply_patch(&mut self, patch: Self::Patch);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TaskStatus {
    #[default]
    Open,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub creator_id: String,
    pub assignee_id: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub creator_id: String,
    pub assignee_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    /// `Some(None)` unassigns.
    pub assignee_id: Option<Option<String>>,
}

impl PagedItem for Task {
    type Key = String;

    fn key(&self) -> String {
        self.id.clone()
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }

    fn text_field(&self, field: TextField) -> Option<&str> {
        match field {
            TextField::Title => Some(&self.title),
            TextField::Content => Some(&self.description),
            TextField::Category => None,
        }
    }

    fn filter_field(&self, field: FilterField) -> Option<&str> {
        match field {
            FilterField::Creator => Some(&self.creator_id),
            FilterField::Assignee => self.assignee_id.as_deref(),
            FilterField::Status => Some(self.status.as_str()),
            FilterField::Priority => Some(self.priority.as_str()),
            FilterField::Category => None,
        }
    }
}

impl Task {
    /// A stored item built from a draft; the store assigns `id` and `created_at`.
    pub fn from_draft(id: impl Into<String>, created_at: Timestamp, draft: TaskDraft) -> Self {
        Self {
            id: id.into(),
            title: draft.title,
            description: draft.description,
            status: TaskStatus::Open,
            priority: draft.priority,
            creator_id: draft.creator_id,
            assignee_id: draft.assignee_id,
            created_at,
        }
    }
}

impl Editable for Task {
    type Draft = TaskDraft;
    type Patch = TaskPatch;

    fn apply_patch(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(assignee_id) = patch.assignee_id {
            self.assignee_id = assignee_id;
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub creator_id: String,
    pub pinned: bool,
    pub created_at: Timestamp,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub category: String,
    pub creator_id: String,
    pub pinned: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub pinned: Option<bool>,
}

impl PagedItem for Note {
    type Key = String;

    fn key(&self) -> String {
        self.id.clone()
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }

    fn is_pinned(&self) -> bool {
        self.pinned
    }

    fn text_field(&self, field: TextField) -> Option<&str> {
        match field {
            TextField::Title => Some(&self.title),
            TextField::Content => Some(&self.content),
            TextField::Category => Some(&self.category),
        }
    }

    fn filter_field(&self, field: FilterField) -> Option<&str> {
        match field {
            FilterField::Creator => Some(&self.creator_id),
            FilterField::Category => Some(&self.category),
            FilterField::Assignee | FilterField::Status | FilterField::Priority => None,
        }
    }
}

impl Note {
    pub fn from_draft(id: impl Into<String>, created_at: Timestamp, draft: NoteDraft) -> Self {
        Self {
            id: id.into(),
            title: draft.title,
            content: draft.content,
            category: draft.category,
            creator_id: draft.creator_id,
            pinned: draft.pinned,
            created_at,
        }
    }
}

impl Editable for Note {
    type Draft = NoteDraft;
    type Patch = NotePatch;

    fn apply_patch(&mut self, patch: NotePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(pinned) = patch.pinned {
            self.pinned = pinned;
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub priority: Priority,
    pub creator_id: String,
    pub assignee_id: Option<String>,
    pub created_at: Timestamp,
}

impl Todo {
    pub fn from_draft(id: impl Into<String>, created_at: Timestamp, draft: TodoDraft) -> Self {
        Self {
            id: id.into(),
            title: draft.title,
            completed: false,
            priority: draft.priority,
            creator_id: draft.creator_id,
            assignee_id: draft.assignee_id,
            created_at,
        }
    }

    pub fn status_str(&self) -> &'static str {
        if self.completed { "completed" } else { "pending" }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TodoDraft {
    pub title: String,
    pub priority: Priority,
    pub creator_id: String,
    pub assignee_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TodoPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub assignee_id: Option<Option<String>>,
}

impl PagedItem for Todo {
    type Key = String;

    fn key(&self) -> String {
        self.id.clone()
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }

    fn text_field(&self, field: TextField) -> Option<&str> {
        match field {
            TextField::Title => Some(&self.title),
            TextField::Content | TextField::Category => None,
        }
    }

    fn filter_field(&self, field: FilterField) -> Option<&str> {
        match field {
            FilterField::Creator => Some(&self.creator_id),
            FilterField::Assignee => self.assignee_id.as_deref(),
            FilterField::Status => Some(self.status_str()),
            FilterField::Priority => Some(self.priority.as_str()),
            FilterField::Category => None,
        }
    }
}

impl Editable for Todo {
    type Draft = TodoDraft;
    type Patch = TodoPatch;

    fn apply_patch(&mut self, patch: TodoPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(assignee_id) = patch.assignee_id {
            self.assignee_id = assignee_id;
        }
    }
}
