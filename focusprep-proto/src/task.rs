//! Task entity model for the `FocusPrep` board.
//!
//! Defines the task record, its status and priority enumerations, the
//! draft/patch shapes used to create and edit tasks, and the two pure
//! due-date helpers shared by every consumer ([`is_overdue`],
//! [`is_due_soon`]).

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum allowed task title length in characters.
pub const MAX_TASK_TITLE_LENGTH: usize = 100;

/// Maximum allowed task description length in characters.
pub const MAX_TASK_DESCRIPTION_LENGTH: usize = 500;

/// Tags offered by the task editor before the user types their own.
pub const PREDEFINED_TAGS: [&str; 16] = [
    "Study",
    "Assignment",
    "Project",
    "Research",
    "Exam",
    "Reading",
    "Math",
    "Science",
    "History",
    "English",
    "Computer Science",
    "Personal",
    "Work",
    "Health",
    "Urgent",
    "Important",
];

/// Opaque task identifier.
///
/// Tasks created here get a UUID v7 string. Ids read from a snapshot are
/// kept verbatim whatever their shape (`"1"`, a browser-generated id, ...),
/// and are only ever compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a new time-ordered task identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self::from_uuid(Uuid::now_v7())
    }

    /// Creates a `TaskId` from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid.to_string())
    }

    /// The id as it appears on the wire and in drag events.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for TaskId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The board column a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started.
    Todo,
    /// Actively being worked on.
    InProgress,
    /// Finished.
    Done,
}

impl TaskStatus {
    /// All statuses in board column order.
    pub const ALL: [Self; 3] = [Self::Todo, Self::InProgress, Self::Done];

    /// Stable column id used as a drop target (`todo`, `in-progress`, `done`).
    #[must_use]
    pub const fn column_id(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }

    /// Parses a column id back into a status.
    #[must_use]
    pub fn from_column_id(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.column_id() == raw)
    }

    /// Human-readable column title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column_id())
    }
}

/// Task priority.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Low priority.
    Low,
    /// Medium priority (editor default).
    #[default]
    Medium,
    /// High priority.
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Validation failures for task input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// Task title cannot be empty.
    #[error("task title cannot be empty")]
    TitleEmpty,
    /// Task title exceeds the maximum length.
    #[error("task title too long (max {max} characters)")]
    TitleTooLong {
        /// Configured limit.
        max: usize,
    },
    /// Task description exceeds the maximum length.
    #[error("task description too long (max {MAX_TASK_DESCRIPTION_LENGTH} characters)")]
    DescriptionTooLong,
}

/// A task on the board.
///
/// Serialized with camelCase keys (`dueDate`, `createdAt`, `updatedAt`) so
/// that snapshots are interchangeable with the browser build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task identifier, immutable after creation.
    pub id: TaskId,
    /// Display title, never empty.
    pub title: String,
    /// Optional long-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the task is due.
    pub due_date: DateTime<Utc>,
    /// Task priority.
    pub priority: Priority,
    /// Column membership.
    pub status: TaskStatus,
    /// Tags in insertion order.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Optional assignee display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the task was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Builds a task from a validated draft, stamping id and timestamps.
    #[must_use]
    pub fn from_draft(draft: TaskDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::new(),
            title: draft.title,
            description: draft.description,
            due_date: draft.due_date,
            priority: draft.priority,
            status: draft.status,
            tags: draft.tags,
            assignee: draft.assignee,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes `updated_at` after a mutation.
    ///
    /// The new value is strictly greater than the previous one even when
    /// the clock has not advanced (or went backwards) since the last write,
    /// unless `updated_at` already sits at the end of the representable
    /// range, where it stays put.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        let floor = self
            .updated_at
            .checked_add_signed(TimeDelta::milliseconds(1))
            .unwrap_or(self.updated_at);
        self.updated_at = now.max(floor);
    }
}

/// Returns `true` if the task is past due and not done.
#[must_use]
pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    task.due_date < now && task.status != TaskStatus::Done
}

/// Returns `true` if the task falls due within `window` from `now` and is
/// not done. Tasks already overdue are not "due soon".
#[must_use]
pub fn is_due_soon(task: &Task, now: DateTime<Utc>, window: TimeDelta) -> bool {
    let until_due = task.due_date - now;
    until_due >= TimeDelta::zero() && until_due < window && task.status != TaskStatus::Done
}

/// Input for creating a task: everything except id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Display title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Due date.
    pub due_date: DateTime<Utc>,
    /// Priority.
    pub priority: Priority,
    /// Initial column.
    pub status: TaskStatus,
    /// Tags in insertion order.
    pub tags: Vec<String>,
    /// Optional assignee.
    pub assignee: Option<String>,
}

impl TaskDraft {
    /// Creates a draft for a new to-do task with medium priority.
    pub fn new(title: impl Into<String>, due_date: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            description: None,
            due_date,
            priority: Priority::default(),
            status: TaskStatus::Todo,
            tags: Vec::new(),
            assignee: None,
        }
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the initial column.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the assignee.
    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Adds a tag, trimming it and skipping blanks and duplicates.
    ///
    /// Returns `true` if the tag was added.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    /// Checks title and description limits.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::TitleEmpty`] for an empty title,
    /// [`TaskError::TitleTooLong`] if it exceeds `max_title_len` characters,
    /// or [`TaskError::DescriptionTooLong`].
    pub fn validate(&self, max_title_len: usize) -> Result<(), TaskError> {
        validate_title(&self.title, max_title_len)?;
        validate_description(self.description.as_deref())
    }
}

/// A partial edit to an existing task. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// New title.
    pub title: Option<String>,
    /// New description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
    /// New due date.
    pub due_date: Option<DateTime<Utc>>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New column.
    pub status: Option<TaskStatus>,
    /// Replacement tag list.
    pub tags: Option<Vec<String>>,
    /// New assignee; `Some(None)` clears it.
    pub assignee: Option<Option<String>>,
}

impl TaskPatch {
    /// Returns `true` if the patch would change none of `task`'s fields.
    #[must_use]
    pub fn is_noop_for(&self, task: &Task) -> bool {
        self.title.as_ref().is_none_or(|t| *t == task.title)
            && self
                .description
                .as_ref()
                .is_none_or(|d| *d == task.description)
            && self.due_date.is_none_or(|d| d == task.due_date)
            && self.priority.is_none_or(|p| p == task.priority)
            && self.status.is_none_or(|s| s == task.status)
            && self.tags.as_ref().is_none_or(|t| *t == task.tags)
            && self.assignee.as_ref().is_none_or(|a| *a == task.assignee)
    }

    /// Checks the patched title and description against the same limits as
    /// a draft.
    ///
    /// # Errors
    ///
    /// Same as [`TaskDraft::validate`].
    pub fn validate(&self, max_title_len: usize) -> Result<(), TaskError> {
        if let Some(title) = &self.title {
            validate_title(title, max_title_len)?;
        }
        if let Some(description) = &self.description {
            validate_description(description.as_deref())?;
        }
        Ok(())
    }

    /// Applies every field except `status`, which the board handles itself.
    pub fn apply_fields(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            task.description.clone_from(description);
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(tags) = &self.tags {
            task.tags.clone_from(tags);
        }
        if let Some(assignee) = &self.assignee {
            task.assignee.clone_from(assignee);
        }
    }
}

fn validate_title(title: &str, max_len: usize) -> Result<(), TaskError> {
    if title.is_empty() {
        return Err(TaskError::TitleEmpty);
    }
    if title.chars().count() > max_len {
        return Err(TaskError::TitleTooLong { max: max_len });
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<(), TaskError> {
    match description {
        Some(d) if d.chars().count() > MAX_TASK_DESCRIPTION_LENGTH => {
            Err(TaskError::DescriptionTooLong)
        }
        _ => Ok(()),
    }
}
