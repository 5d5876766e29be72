//! Periodic tick driver for the timer engine.
//!
//! `FocusTimer` owns the engine behind a shared lock and at most one live
//! tokio ticker. The ticker is aborted before every call that changes the
//! phase, and each ticker also carries the epoch it was armed for, so a tick
//! that was already in flight when the phase changed does nothing.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::engine::{TickOutcome, TimerEngine, TimerPhase, TimerSnapshot};
use super::{DEFAULT_TICK_INTERVAL, TimerEvent};
use crate::clock::Clock;

/// A timer engine plus the background task that ticks it.
///
/// Controls must be called from within a tokio runtime because arming the
/// ticker spawns a task.
pub struct FocusTimer<C: Clock + 'static> {
    engine: Arc<Mutex<TimerEngine<C>>>,
    period: Duration,
    ticker: Option<JoinHandle<()>>,
}

impl<C: Clock + 'static> FocusTimer<C> {
    /// Wraps `engine`, ticking once per second.
    #[must_use]
    pub fn new(engine: TimerEngine<C>) -> Self {
        Self::with_period(engine, DEFAULT_TICK_INTERVAL)
    }

    /// Wraps `engine`, ticking every `period`.
    #[must_use]
    pub fn with_period(engine: TimerEngine<C>, period: Duration) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            period,
            ticker: None,
        }
    }

    /// Routes tick and completion callbacks into a channel.
    ///
    /// Callbacks run while the engine lock is held, so consumers that need
    /// to call back into the timer should do so from the receiving end.
    #[must_use]
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<TimerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut engine = self.engine.lock();
        let tick_tx = tx.clone();
        engine.on_tick(move |remaining| {
            let _ = tick_tx.send(TimerEvent::Tick(remaining));
        });
        engine.on_complete(move |epoch| {
            let _ = tx.send(TimerEvent::Completed { epoch });
        });
        rx
    }

    /// Copies the engine's observable state.
    #[must_use]
    pub fn snapshot(&self) -> TimerSnapshot {
        self.engine.lock().snapshot()
    }

    /// Returns `true` while a ticker task is alive.
    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Starts a session and arms the ticker.
    pub fn start(&mut self) -> bool {
        let started = self.engine.lock().start();
        if started {
            self.arm();
        }
        started
    }

    /// Pauses the running session.
    pub fn pause(&mut self) -> bool {
        self.disarm();
        self.engine.lock().pause()
    }

    /// Resumes a paused session and re-arms the ticker.
    pub fn resume(&mut self) -> bool {
        let resumed = self.engine.lock().resume();
        if resumed {
            self.arm();
        }
        resumed
    }

    /// Returns to idle with the full duration.
    pub fn reset(&mut self) -> bool {
        self.disarm();
        self.engine.lock().reset()
    }

    /// Changes the session length, abandoning any session in progress.
    pub fn set_duration(&mut self, duration_secs: u64) -> bool {
        self.disarm();
        self.engine.lock().set_duration(duration_secs)
    }

    /// Start when idle or completed, pause when running, resume when paused.
    pub fn toggle(&mut self) -> bool {
        let phase = self.engine.lock().phase();
        match phase {
            TimerPhase::Running => self.pause(),
            TimerPhase::Paused => self.resume(),
            TimerPhase::Idle | TimerPhase::Completed => self.start(),
        }
    }

    fn arm(&mut self) {
        self.disarm();
        let engine = Arc::clone(&self.engine);
        let epoch = engine.lock().epoch();
        let period = self.period;
        let first = tokio::time::Instant::now() + period;
        debug!(epoch, ?period, "arming timer ticker");
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(first, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let keep_going = {
                    let mut engine = engine.lock();
                    engine.epoch() == epoch && matches!(engine.tick(), TickOutcome::Ticked(_))
                };
                if !keep_going {
                    break;
                }
            }
        }));
    }

    fn disarm(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl<C: Clock + 'static> Drop for FocusTimer<C> {
    fn drop(&mut self) {
        self.disarm();
    }
}

impl<C: Clock + 'static> std::fmt::Debug for FocusTimer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusTimer")
            .field("snapshot", &self.snapshot())
            .field("period", &self.period)
            .field("ticking", &self.is_ticking())
            .finish()
    }
}
