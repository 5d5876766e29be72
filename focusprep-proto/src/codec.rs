//! JSON snapshot format for state persisted between sessions.
//!
//! Every persisted value is an opaque JSON blob stored under a fixed key.
//! Decoding is strict: callers treat any [`CodecError`] as "no usable state"
//! and fall back to defaults.

use std::collections::HashSet;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::task::Task;

/// Key for the JSON array of tasks in global board order.
pub const TASKS_KEY: &str = "focusprep-tasks";

/// Key for the JSON array of completed focus sessions.
pub const SESSIONS_KEY: &str = "focusprep-sessions";

/// Key for the JSON array of distraction blockers.
pub const BLOCKERS_KEY: &str = "focusprep-blockers";

/// Key for the persisted application state (user, theme, settings).
pub const APP_STATE_KEY: &str = "focusprep-state";

/// Error type for snapshot encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// A task collection listed the same id twice.
    #[error("duplicate task id in snapshot: {0}")]
    DuplicateTaskId(String),
}

/// Encodes any persisted value as compact JSON.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the value cannot be serialized.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, CodecError> {
    Ok(serde_json::to_string(value)?)
}

/// Decodes a persisted value from JSON.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the text is not valid JSON for `T`.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, CodecError> {
    Ok(serde_json::from_str(text)?)
}

/// Decodes a task collection and checks that ids are unique.
///
/// # Errors
///
/// Returns `CodecError::Serialization` for malformed JSON or records, and
/// `CodecError::DuplicateTaskId` if an id appears more than once.
pub fn decode_tasks(text: &str) -> Result<Vec<Task>, CodecError> {
    let tasks: Vec<Task> = decode(text)?;
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in &tasks {
        if !seen.insert(&task.id) {
            return Err(CodecError::DuplicateTaskId(task.id.to_string()));
        }
    }
    Ok(tasks)
}
