//! Drag-end resolution.
//!
//! A drop gesture reports the dragged task id and whatever it was released
//! over: a column id (`todo`, `in-progress`, `done`), another task's id, or
//! nothing. [`resolve_drag_end`] maps that to exactly one board operation
//! without touching the board.

use focusprep_proto::task::{TaskId, TaskStatus};

use super::BoardRead;

/// The end of a drag gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragEndEvent {
    /// Id of the dragged task.
    pub active: String,
    /// Id of the drop target, either a column id or a task id.
    pub over: Option<String>,
}

impl DragEndEvent {
    /// A drop of task `active` onto the column for `status`.
    #[must_use]
    pub fn onto_column(active: &TaskId, status: TaskStatus) -> Self {
        Self {
            active: active.to_string(),
            over: Some(status.column_id().to_string()),
        }
    }

    /// A drop of task `active` onto task `target`.
    #[must_use]
    pub fn onto_task(active: &TaskId, target: &TaskId) -> Self {
        Self {
            active: active.to_string(),
            over: Some(target.to_string()),
        }
    }

    /// A drop outside any target.
    #[must_use]
    pub fn cancelled(active: &TaskId) -> Self {
        Self {
            active: active.to_string(),
            over: None,
        }
    }
}

/// Why a drop produced no board operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredDrop {
    /// Released outside any drop target.
    NoTarget,
    /// Released over itself.
    OntoSelf,
    /// The dragged id is not a task on the board.
    UnknownActive,
    /// The target is neither a column nor a task on the board.
    UnknownTarget,
}

/// The board operation a drop resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragAction {
    /// Change the task's column (it lands last there).
    MoveToColumn {
        /// Dragged task.
        id: TaskId,
        /// Destination column.
        status: TaskStatus,
    },
    /// Move the task in front of another task of the same column.
    Reorder {
        /// Dragged task.
        id: TaskId,
        /// Task it is dropped on.
        before: TaskId,
    },
    /// Nothing to do.
    Ignored(IgnoredDrop),
}

/// Maps a drop gesture to a board operation.
///
/// Dropping onto a column moves the task there. Column ids are matched
/// before task ids, so a task whose id happens to be `done` still cannot
/// shadow the column. Dropping onto a task of the same column reorders;
/// onto a task of another column moves the dragged task to that column,
/// appended rather than at the drop row.
#[must_use]
pub fn resolve_drag_end(board: &impl BoardRead, event: &DragEndEvent) -> DragAction {
    let Some(over) = event.over.as_deref() else {
        return DragAction::Ignored(IgnoredDrop::NoTarget);
    };
    let Some(active) = board.find(&event.active) else {
        return DragAction::Ignored(IgnoredDrop::UnknownActive);
    };

    if let Some(status) = TaskStatus::from_column_id(over) {
        return DragAction::MoveToColumn {
            id: active.id.clone(),
            status,
        };
    }
    if over == event.active {
        return DragAction::Ignored(IgnoredDrop::OntoSelf);
    }

    let Some(target) = board.find(over) else {
        return DragAction::Ignored(IgnoredDrop::UnknownTarget);
    };
    if target.status == active.status {
        DragAction::Reorder {
            id: active.id.clone(),
            before: target.id.clone(),
        }
    } else {
        DragAction::MoveToColumn {
            id: active.id.clone(),
            status: target.status,
        }
    }
}
