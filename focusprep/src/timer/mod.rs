//! Focus timer.
//!
//! [`TimerEngine`] is the synchronous countdown state machine; it is driven
//! by explicit [`TimerEngine::tick`] calls and is fully testable against a
//! manual clock. [`FocusTimer`] adds the tokio ticker used by the app.

pub mod driver;
pub mod engine;

pub use driver::FocusTimer;
pub use engine::{TickOutcome, TimerEngine, TimerPhase, TimerSnapshot};

use std::time::Duration;

/// How often a running timer is re-evaluated unless configured otherwise.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Timer notifications forwarded to the UI loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Remaining whole seconds after a tick.
    Tick(u64),
    /// The session ran out. `epoch` identifies the completed run; it no
    /// longer matches the timer's snapshot once the timer has been touched.
    Completed {
        /// Engine epoch at completion.
        epoch: u64,
    },
}
