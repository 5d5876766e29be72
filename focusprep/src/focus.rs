//! Focus sessions and distraction blockers.
//!
//! `FocusTracker` keeps the blocker toggles, the log of finished sessions
//! and the focus/break cycle. It never drives the countdown itself; the app
//! tells it when a timer session completes and asks it what comes next.

use chrono::{DateTime, TimeDelta, Utc};
use focusprep_proto::session::{DistractionBlocker, FocusSession, SessionKind};
use focusprep_proto::settings::FocusSettings;
use tracing::debug;
use uuid::Uuid;

/// Every this many focus sessions, the break is a long one.
pub const LONG_BREAK_EVERY: u32 = 4;

/// Totals over the session log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusStats {
    /// Completed focus sessions.
    pub sessions: usize,
    /// Minutes spent in completed focus sessions.
    pub focus_minutes: u32,
    /// Sum of blockers that were enabled across completed focus sessions.
    pub distractions_blocked: u32,
}

/// Blockers, session log and break cycle.
#[derive(Debug, Clone)]
pub struct FocusTracker {
    blockers: Vec<DistractionBlocker>,
    sessions: Vec<FocusSession>,
    focus_streak: u32,
    next_kind: SessionKind,
}

impl Default for FocusTracker {
    fn default() -> Self {
        Self::new(DistractionBlocker::defaults(), Vec::new())
    }
}

impl FocusTracker {
    /// Restores a tracker from saved blockers and sessions. The cycle
    /// always restarts with a focus session.
    #[must_use]
    pub const fn new(blockers: Vec<DistractionBlocker>, sessions: Vec<FocusSession>) -> Self {
        Self {
            blockers,
            sessions,
            focus_streak: 0,
            next_kind: SessionKind::Focus,
        }
    }

    /// Blockers in display order.
    #[must_use]
    pub fn blockers(&self) -> &[DistractionBlocker] {
        &self.blockers
    }

    /// Completed sessions, oldest first.
    #[must_use]
    pub fn sessions(&self) -> &[FocusSession] {
        &self.sessions
    }

    /// Up to `n` most recent sessions, newest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &FocusSession> {
        self.sessions.iter().rev().take(n)
    }

    /// Number of blockers currently enabled.
    #[must_use]
    pub fn enabled_blockers(&self) -> u32 {
        u32::try_from(self.blockers.iter().filter(|b| b.enabled).count()).unwrap_or(u32::MAX)
    }

    /// Flips a blocker on or off. Returns `false` for an unknown id.
    pub fn toggle_blocker(&mut self, id: &str) -> bool {
        let Some(blocker) = self.blockers.iter_mut().find(|b| b.id == id) else {
            return false;
        };
        blocker.enabled = !blocker.enabled;
        debug!(id, enabled = blocker.enabled, "blocker toggled");
        true
    }

    /// The kind of session the cycle expects next.
    #[must_use]
    pub const fn next_kind(&self) -> SessionKind {
        self.next_kind
    }

    /// Session length in minutes for `kind`. Focus sessions use the
    /// currently selected length; breaks come from the settings.
    #[must_use]
    pub const fn minutes_for(kind: SessionKind, focus_minutes: u32, settings: &FocusSettings) -> u32 {
        match kind {
            SessionKind::Focus => focus_minutes,
            SessionKind::ShortBreak => settings.break_duration,
            SessionKind::LongBreak => settings.long_break_duration,
        }
    }

    /// Whether the next session should start without user input.
    #[must_use]
    pub const fn auto_start_next(&self, settings: &FocusSettings) -> bool {
        settings.auto_start_breaks && !matches!(self.next_kind, SessionKind::Focus)
    }

    /// Logs a session of `kind` that ran `minutes` and ended at `ended_at`,
    /// then advances the cycle.
    ///
    /// Focus sessions are credited with the blockers enabled right now.
    pub fn record_completion(
        &mut self,
        kind: SessionKind,
        minutes: u32,
        ended_at: DateTime<Utc>,
    ) -> FocusSession {
        let distractions_avoided = match kind {
            SessionKind::Focus => self.enabled_blockers(),
            SessionKind::ShortBreak | SessionKind::LongBreak => 0,
        };
        let session = FocusSession {
            id: Uuid::now_v7(),
            kind,
            duration: minutes,
            start_time: ended_at - TimeDelta::minutes(i64::from(minutes)),
            end_time: ended_at,
            distractions_avoided,
        };
        self.sessions.push(session.clone());

        self.next_kind = match kind {
            SessionKind::Focus => {
                self.focus_streak += 1;
                if self.focus_streak % LONG_BREAK_EVERY == 0 {
                    SessionKind::LongBreak
                } else {
                    SessionKind::ShortBreak
                }
            }
            SessionKind::ShortBreak | SessionKind::LongBreak => SessionKind::Focus,
        };
        debug!(kind = kind.label(), minutes, next = self.next_kind.label(), "session recorded");
        session
    }

    /// Skips ahead to a focus session without logging anything.
    pub const fn skip_to_focus(&mut self) {
        self.next_kind = SessionKind::Focus;
    }

    /// Totals over the focus sessions in the log. Sums saturate, since the
    /// log may come from a hand-edited file.
    #[must_use]
    pub fn stats(&self) -> FocusStats {
        self.sessions
            .iter()
            .filter(|s| s.kind == SessionKind::Focus)
            .fold(FocusStats::default(), |mut acc, s| {
                acc.sessions += 1;
                acc.focus_minutes = acc.focus_minutes.saturating_add(s.duration);
                acc.distractions_blocked =
                    acc.distractions_blocked.saturating_add(s.distractions_avoided);
                acc
            })
    }
}
