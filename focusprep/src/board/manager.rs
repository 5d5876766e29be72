//! The board state manager.
//!
//! `Board` owns the global task sequence and is the only thing that mutates
//! tasks. Every mutating method returns whether the collection changed so
//! the caller can persist on each committed mutation, and subscribers are
//! told what happened through [`BoardChange`].

use chrono::{DateTime, Utc};
use focusprep_proto::task::{
    MAX_TASK_TITLE_LENGTH, Task, TaskDraft, TaskError, TaskId, TaskPatch, TaskStatus, is_overdue,
};
use tracing::{debug, warn};

use super::drag::{DragAction, DragEndEvent, resolve_drag_end};
use super::filter::{BoardStats, TaskFilter};
use super::{BoardChange, BoardRead, BoardWrite};
use crate::clock::{Clock, SystemClock};

/// Callback invoked after every committed mutation with the change and the
/// resulting task sequence.
pub type BoardListener = Box<dyn FnMut(&BoardChange, &[Task]) + Send>;

/// Kanban board backed by a single ordered task sequence.
pub struct Board<C: Clock = SystemClock> {
    tasks: Vec<Task>,
    clock: C,
    max_title_len: usize,
    listeners: Vec<BoardListener>,
}

impl<C: Clock> Board<C> {
    /// Creates an empty board.
    #[must_use]
    pub fn new(clock: C) -> Self {
        Self {
            tasks: Vec::new(),
            clock,
            max_title_len: MAX_TASK_TITLE_LENGTH,
            listeners: Vec::new(),
        }
    }

    /// Creates a board from a previously saved sequence.
    ///
    /// Later duplicates of an id are dropped so the sequence stays a
    /// permutation of distinct tasks.
    #[must_use]
    pub fn with_tasks(clock: C, tasks: Vec<Task>) -> Self {
        let mut board = Self::new(clock);
        for task in tasks {
            if board.index_of(&task.id).is_some() {
                warn!(id = %task.id, "dropping duplicate task while hydrating board");
                continue;
            }
            board.tasks.push(task);
        }
        board
    }

    /// Overrides the title length limit applied to drafts and patches.
    #[must_use]
    pub const fn with_max_title_len(mut self, max_title_len: usize) -> Self {
        self.max_title_len = max_title_len;
        self
    }

    /// The title length limit in characters.
    #[must_use]
    pub const fn max_title_len(&self) -> usize {
        self.max_title_len
    }

    /// Registers an observer for committed mutations.
    pub fn subscribe(&mut self, listener: impl FnMut(&BoardChange, &[Task]) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// All tasks in global order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of tasks on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if the board has no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Counts per column, plus tasks overdue as of `now`.
    #[must_use]
    pub fn stats(&self, now: DateTime<Utc>) -> BoardStats {
        let mut stats = BoardStats {
            total: self.tasks.len(),
            ..BoardStats::default()
        };
        for task in &self.tasks {
            match task.status {
                TaskStatus::Todo => stats.todo += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Done => stats.done += 1,
            }
            if is_overdue(task, now) {
                stats.overdue += 1;
            }
        }
        stats
    }

    /// Tasks matching `filter`, in global order. Only affects what is shown.
    #[must_use]
    pub fn filtered(&self, filter: &TaskFilter) -> Vec<&Task> {
        self.tasks.iter().filter(|t| filter.matches(t)).collect()
    }

    /// Tasks of one column that match `filter`, in global order.
    #[must_use]
    pub fn filtered_column(&self, status: TaskStatus, filter: &TaskFilter) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.status == status && filter.matches(t))
            .collect()
    }

    /// Creates a task and appends it to the global sequence.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::TitleEmpty`], [`TaskError::TitleTooLong`] or
    /// [`TaskError::DescriptionTooLong`] if the draft is invalid.
    pub fn add_task(&mut self, draft: TaskDraft) -> Result<Task, TaskError> {
        draft.validate(self.max_title_len)?;
        let task = Task::from_draft(draft, self.clock.now_utc());
        debug!(id = %task.id, status = %task.status, "task added");
        self.tasks.push(task.clone());
        self.notify(&BoardChange::Added(task.id.clone()));
        Ok(task)
    }

    /// Applies `patch` to a task.
    ///
    /// Returns `Ok(false)` for an unknown id or a patch that changes
    /// nothing. A status change relocates the task to the end of the
    /// sequence, exactly like [`Board::move_to_column`].
    ///
    /// # Errors
    ///
    /// Returns a [`TaskError`] if the patched title or description is
    /// invalid. The task is left untouched in that case.
    pub fn edit_task(&mut self, id: &TaskId, patch: &TaskPatch) -> Result<bool, TaskError> {
        let Some(index) = self.index_of(id) else {
            return Ok(false);
        };
        if patch.is_noop_for(&self.tasks[index]) {
            return Ok(false);
        }
        patch.validate(self.max_title_len)?;

        let now = self.clock.now_utc();
        let mut task = self.tasks.remove(index);
        let from = task.status;
        patch.apply_fields(&mut task);
        task.touch(now);

        let change = match patch.status {
            Some(to) if to != from => {
                task.status = to;
                self.tasks.push(task);
                BoardChange::Moved {
                    id: id.clone(),
                    from,
                    to,
                }
            }
            _ => {
                self.tasks.insert(index, task);
                BoardChange::Edited(id.clone())
            }
        };
        debug!(%id, ?change, "task edited");
        self.notify(&change);
        Ok(true)
    }

    /// Removes a task. Returns `false` if it was not on the board.
    pub fn delete_task(&mut self, id: &TaskId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.tasks.remove(index);
        debug!(%id, "task deleted");
        self.notify(&BoardChange::Deleted(id.clone()));
        true
    }

    /// Moves a task into `status`'s column, placing it last.
    ///
    /// No-op for an unknown id or when the task is already in that column.
    pub fn move_to_column(&mut self, id: &TaskId, status: TaskStatus) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let from = self.tasks[index].status;
        if from == status {
            return false;
        }
        let mut task = self.tasks.remove(index);
        task.status = status;
        task.touch(self.clock.now_utc());
        self.tasks.push(task);
        debug!(%id, %from, to = %status, "task moved");
        self.notify(&BoardChange::Moved {
            id: id.clone(),
            from,
            to: status,
        });
        true
    }

    /// Moves `id` so that it sits immediately before `target`.
    ///
    /// The insertion point is `target`'s index after `id` has been removed.
    /// Status is never changed. Returns `false` when the ids are equal,
    /// either is missing, or the order is already as requested.
    pub fn reorder(&mut self, id: &TaskId, target: &TaskId) -> bool {
        if id == target {
            return false;
        }
        let (Some(from), Some(_)) = (self.index_of(id), self.index_of(target)) else {
            return false;
        };
        let task = self.tasks.remove(from);
        let to = self.index_of(target).unwrap_or(from);
        self.tasks.insert(to, task);
        if to == from {
            return false;
        }
        debug!(%id, before = %target, "task reordered");
        self.notify(&BoardChange::Reordered {
            id: id.clone(),
            before: target.clone(),
        });
        true
    }

    /// Resolves a drop gesture against the current board and applies it.
    pub fn on_drag_end(&mut self, event: &DragEndEvent) -> bool {
        match resolve_drag_end(&*self, event) {
            DragAction::MoveToColumn { id, status } => self.move_to_column(&id, status),
            DragAction::Reorder { id, before } => self.reorder(&id, &before),
            DragAction::Ignored(reason) => {
                debug!(active = %event.active, ?reason, "drop ignored");
                false
            }
        }
    }

    fn index_of(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == *id)
    }

    fn notify(&mut self, change: &BoardChange) {
        for listener in &mut self.listeners {
            listener(change, &self.tasks);
        }
    }
}

impl<C: Clock> BoardRead for Board<C> {
    fn tasks(&self) -> &[Task] {
        &self.tasks
    }
}

impl<C: Clock> BoardWrite for Board<C> {
    fn add_task(&mut self, draft: TaskDraft) -> Result<Task, TaskError> {
        Self::add_task(self, draft)
    }

    fn edit_task(&mut self, id: &TaskId, patch: &TaskPatch) -> Result<bool, TaskError> {
        Self::edit_task(self, id, patch)
    }

    fn delete_task(&mut self, id: &TaskId) -> bool {
        Self::delete_task(self, id)
    }

    fn move_to_column(&mut self, id: &TaskId, status: TaskStatus) -> bool {
        Self::move_to_column(self, id, status)
    }

    fn reorder(&mut self, id: &TaskId, target: &TaskId) -> bool {
        Self::reorder(self, id, target)
    }

    fn on_drag_end(&mut self, event: &DragEndEvent) -> bool {
        Self::on_drag_end(self, event)
    }
}

impl<C: Clock> std::fmt::Debug for Board<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("tasks", &self.tasks.len())
            .field("max_title_len", &self.max_title_len)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
