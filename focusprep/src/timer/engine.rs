//! The countdown state machine.
//!
//! Elapsed time is never accumulated tick by tick. Each recomputation
//! subtracts the start anchor and the total paused time from "now", so late,
//! skipped or coalesced ticks cannot make the countdown drift.

use tracing::debug;

use crate::clock::Clock;

/// Callback receiving the remaining whole seconds after each tick.
pub type TickCallback = Box<dyn FnMut(u64) + Send>;

/// Callback invoked once when a session runs out.
pub type CompleteCallback = Box<dyn FnMut(u64) + Send>;

/// Lifecycle phase of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerPhase {
    /// Not started, or reset.
    Idle,
    /// Counting down.
    Running,
    /// Frozen by `pause`.
    Paused,
    /// Reached zero; stays here until `reset` or `start`.
    Completed,
}

impl std::fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// What a call to [`TimerEngine::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer is not running; nothing was recomputed.
    Inactive,
    /// Remaining seconds were recomputed and the session continues.
    Ticked(u64),
    /// The session just reached zero. Ticking must stop.
    Completed,
}

/// A copy of the engine's observable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSnapshot {
    /// Current phase.
    pub phase: TimerPhase,
    /// Configured session length in seconds.
    pub duration_secs: u64,
    /// Remaining whole seconds.
    pub remaining_secs: u64,
    /// Transition counter.
    pub epoch: u64,
}

impl TimerSnapshot {
    /// Completion percentage in `0.0..=100.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        let done = self.duration_secs.saturating_sub(self.remaining_secs);
        done as f64 / self.duration_secs as f64 * 100.0
    }
}

/// Wall-clock anchored countdown.
///
/// Every operation returns whether it applied; calls that are invalid for
/// the current phase are ignored. Each applied phase change bumps
/// [`epoch`](Self::epoch), which lets an external ticker detect that it has
/// been superseded.
pub struct TimerEngine<C: Clock> {
    clock: C,
    duration_secs: u64,
    remaining_secs: u64,
    anchor_start: Option<u64>,
    accumulated_pause_ms: u64,
    paused_at: Option<u64>,
    phase: TimerPhase,
    epoch: u64,
    on_tick: Option<TickCallback>,
    on_complete: Option<CompleteCallback>,
}

impl<C: Clock> TimerEngine<C> {
    /// Creates an idle timer for `duration_secs`.
    #[must_use]
    pub const fn new(clock: C, duration_secs: u64) -> Self {
        Self {
            clock,
            duration_secs,
            remaining_secs: duration_secs,
            anchor_start: None,
            accumulated_pause_ms: 0,
            paused_at: None,
            phase: TimerPhase::Idle,
            epoch: 0,
            on_tick: None,
            on_complete: None,
        }
    }

    /// Sets the per-tick callback, replacing any previous one.
    pub fn on_tick(&mut self, callback: impl FnMut(u64) + Send + 'static) {
        self.on_tick = Some(Box::new(callback));
    }

    /// Sets the completion callback, replacing any previous one.
    ///
    /// The callback receives the epoch of the completed phase, which stays
    /// current until the next control call.
    pub fn on_complete(&mut self, callback: impl FnMut(u64) + Send + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> TimerPhase {
        self.phase
    }

    /// Configured session length in seconds.
    #[must_use]
    pub const fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    /// Remaining whole seconds, recomputed from the anchors while running.
    #[must_use]
    pub fn remaining_secs(&self) -> u64 {
        if self.phase == TimerPhase::Running {
            self.remaining_at(self.clock.now_ms())
        } else {
            self.remaining_secs
        }
    }

    /// Transition counter; changes whenever the phase does.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Completion percentage in `0.0..=100.0`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.snapshot().progress()
    }

    /// Copies the observable state.
    #[must_use]
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            duration_secs: self.duration_secs,
            remaining_secs: self.remaining_secs(),
            epoch: self.epoch,
        }
    }

    /// Starts a fresh session from idle or completed.
    pub fn start(&mut self) -> bool {
        if !matches!(self.phase, TimerPhase::Idle | TimerPhase::Completed) {
            return false;
        }
        self.anchor_start = Some(self.clock.now_ms());
        self.accumulated_pause_ms = 0;
        self.paused_at = None;
        self.remaining_secs = self.duration_secs;
        self.transition(TimerPhase::Running);
        true
    }

    /// Freezes a running session at the remaining time computed for now.
    pub fn pause(&mut self) -> bool {
        if self.phase != TimerPhase::Running {
            return false;
        }
        let now = self.clock.now_ms();
        self.remaining_secs = self.remaining_at(now);
        self.paused_at = Some(now);
        self.transition(TimerPhase::Paused);
        true
    }

    /// Continues a paused session. The paused interval is excluded from
    /// elapsed time.
    pub fn resume(&mut self) -> bool {
        if self.phase != TimerPhase::Paused {
            return false;
        }
        let now = self.clock.now_ms();
        if let Some(paused_at) = self.paused_at.take() {
            self.accumulated_pause_ms += now.saturating_sub(paused_at);
        }
        self.transition(TimerPhase::Running);
        true
    }

    /// Returns to idle with the full duration remaining.
    ///
    /// Returns `false` only when the timer was already idle.
    pub fn reset(&mut self) -> bool {
        if self.phase == TimerPhase::Idle {
            return false;
        }
        self.clear();
        self.transition(TimerPhase::Idle);
        true
    }

    /// Changes the session length. Implies a reset, so a running session is
    /// abandoned.
    pub fn set_duration(&mut self, duration_secs: u64) -> bool {
        self.duration_secs = duration_secs;
        self.clear();
        self.transition(TimerPhase::Idle);
        true
    }

    /// Recomputes the remaining time of a running session.
    ///
    /// Invokes the tick callback with the new value. When the value reaches
    /// zero the timer completes, the completion callback runs exactly once,
    /// and [`TickOutcome::Completed`] tells the caller to stop ticking.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != TimerPhase::Running {
            return TickOutcome::Inactive;
        }
        let remaining = self.remaining_at(self.clock.now_ms());
        self.remaining_secs = remaining;
        if let Some(on_tick) = self.on_tick.as_mut() {
            on_tick(remaining);
        }
        if remaining > 0 {
            return TickOutcome::Ticked(remaining);
        }
        self.anchor_start = None;
        self.transition(TimerPhase::Completed);
        let epoch = self.epoch;
        if let Some(on_complete) = self.on_complete.as_mut() {
            on_complete(epoch);
        }
        TickOutcome::Completed
    }

    /// Remaining seconds for `now`, never above the last recorded value so
    /// the countdown cannot run backwards if the clock does.
    fn remaining_at(&self, now: u64) -> u64 {
        let Some(anchor) = self.anchor_start else {
            return self.remaining_secs;
        };
        let elapsed_ms = now
            .saturating_sub(anchor)
            .saturating_sub(self.accumulated_pause_ms);
        let remaining = self.duration_secs.saturating_sub(elapsed_ms / 1000);
        remaining.min(self.remaining_secs)
    }

    fn clear(&mut self) {
        self.remaining_secs = self.duration_secs;
        self.anchor_start = None;
        self.accumulated_pause_ms = 0;
        self.paused_at = None;
    }

    fn transition(&mut self, to: TimerPhase) {
        debug!(from = %self.phase, %to, remaining = self.remaining_secs, "timer transition");
        self.phase = to;
        self.epoch += 1;
    }
}

impl<C: Clock> std::fmt::Debug for TimerEngine<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("phase", &self.phase)
            .field("duration_secs", &self.duration_secs)
            .field("remaining_secs", &self.remaining_secs)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}
