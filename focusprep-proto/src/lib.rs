//! Shared data model and snapshot format for `FocusPrep`.

pub mod codec;
pub mod session;
pub mod settings;
pub mod task;
