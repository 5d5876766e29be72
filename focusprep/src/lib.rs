//! `FocusPrep`: terminal study planner library.
//!
//! A kanban task board with drag-and-drop semantics, a wall-clock anchored
//! focus timer, distraction blockers and JSON blob persistence.

pub mod app;
pub mod board;
pub mod clock;
pub mod config;
pub mod focus;
pub mod state;
pub mod store;
pub mod timer;
pub mod ui;
