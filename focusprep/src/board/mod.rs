//! Kanban board engine.
//!
//! The [`Board`] owns the single authoritative ordered task sequence. Each
//! column's order is that sequence filtered by status, so a task is always
//! in exactly one column. Drag gestures are turned into board operations by
//! the resolver in [`drag`]; search and priority filters in [`filter`] are a
//! view concern and never restrict what the engine operates on.
//!
//! Presentation code talks to the board through the narrow [`BoardRead`] /
//! [`BoardWrite`] capability traits rather than the concrete type.

pub mod drag;
pub mod filter;
pub mod manager;

pub use drag::{DragAction, DragEndEvent, IgnoredDrop, resolve_drag_end};
pub use filter::{BoardStats, TaskFilter};
pub use manager::Board;

use focusprep_proto::task::{Task, TaskDraft, TaskError, TaskId, TaskPatch, TaskStatus};

/// One column of the board: a status and its tasks in global order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column<'a> {
    /// The status bucket.
    pub status: TaskStatus,
    /// Tasks in this column, in global order.
    pub tasks: Vec<&'a Task>,
}

/// A committed board mutation, delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardChange {
    /// A task was created.
    Added(TaskId),
    /// A task's fields were edited (a status change through an edit is
    /// reported as [`BoardChange::Moved`]).
    Edited(TaskId),
    /// A task changed column and now sits last in it.
    Moved {
        /// The task.
        id: TaskId,
        /// Previous column.
        from: TaskStatus,
        /// New column.
        to: TaskStatus,
    },
    /// A task was moved in front of another task of the same column.
    Reordered {
        /// The task that moved.
        id: TaskId,
        /// The task it now precedes.
        before: TaskId,
    },
    /// A task was removed.
    Deleted(TaskId),
}

/// Read access to the board.
pub trait BoardRead {
    /// All tasks in global order.
    fn tasks(&self) -> &[Task];

    /// Looks up a task by id.
    fn get(&self, id: &TaskId) -> Option<&Task> {
        self.find(id.as_str())
    }

    /// Looks up a task by the raw id string of a drag event.
    fn find(&self, raw: &str) -> Option<&Task> {
        self.tasks().iter().find(|t| t.id.as_str() == raw)
    }

    /// Tasks whose status is `status`, in global order.
    fn tasks_by_column(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks().iter().filter(|t| t.status == status).collect()
    }

    /// Every column in board order (todo, in-progress, done).
    fn columns(&self) -> Vec<Column<'_>> {
        TaskStatus::ALL
            .into_iter()
            .map(|status| Column {
                status,
                tasks: self.tasks_by_column(status),
            })
            .collect()
    }
}

/// Mutating access to the board.
///
/// Every method reports whether the task collection changed. Unknown ids
/// are silently ignored.
pub trait BoardWrite {
    /// Creates a task from `draft` and appends it to the global sequence.
    ///
    /// # Errors
    ///
    /// Returns a [`TaskError`] if the draft fails validation.
    fn add_task(&mut self, draft: TaskDraft) -> Result<Task, TaskError>;

    /// Applies `patch` to the task.
    ///
    /// # Errors
    ///
    /// Returns a [`TaskError`] if the patched fields fail validation.
    fn edit_task(&mut self, id: &TaskId, patch: &TaskPatch) -> Result<bool, TaskError>;

    /// Removes the task.
    fn delete_task(&mut self, id: &TaskId) -> bool;

    /// Moves the task to the end of `status`'s column.
    fn move_to_column(&mut self, id: &TaskId, status: TaskStatus) -> bool;

    /// Moves `id` in front of `target` without changing its status.
    fn reorder(&mut self, id: &TaskId, target: &TaskId) -> bool;

    /// Resolves a drop gesture and applies the resulting operation.
    fn on_drag_end(&mut self, event: &DragEndEvent) -> bool;
}
