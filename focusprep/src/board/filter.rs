//! View filters and board statistics.

use focusprep_proto::task::{Priority, Task, TaskStatus};

/// What the board view currently shows. The default shows everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive substring matched against title, description and tags.
    pub search: String,
    /// Only tasks with this status.
    pub status: Option<TaskStatus>,
    /// Only tasks with this priority.
    pub priority: Option<Priority>,
}

impl TaskFilter {
    /// Returns `true` if the filter hides nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.status.is_none() && self.priority.is_none()
    }

    /// Returns `true` if `task` should be shown.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        if self.status.is_some_and(|s| s != task.status) {
            return false;
        }
        if self.priority.is_some_and(|p| p != task.priority) {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        task.title.to_lowercase().contains(&needle)
            || task
                .description
                .as_ref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
            || task
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&needle))
    }
}

/// Task counts shown above the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardStats {
    /// All tasks.
    pub total: usize,
    /// Tasks in the to-do column.
    pub todo: usize,
    /// Tasks in progress.
    pub in_progress: usize,
    /// Finished tasks.
    pub done: usize,
    /// Past-due tasks that are not done.
    pub overdue: usize,
}
