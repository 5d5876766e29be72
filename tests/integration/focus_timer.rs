//! Integration tests for the focus timer and the session cycle.
//!
//! Runs the ticker on a paused tokio clock so wall-clock anchoring, pause
//! accounting and completion can be checked at exact instants.
//!
//! Verification command: `cargo test --test focus_timer`

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use chrono::DateTime;
use tokio::sync::mpsc;

use focusprep::clock::{ManualClock, TokioClock};
use focusprep::focus::FocusTracker;
use focusprep::timer::{FocusTimer, TickOutcome, TimerEngine, TimerEvent, TimerPhase};
use focusprep_proto::session::SessionKind;
use focusprep_proto::settings::FocusSettings;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_timer(duration_secs: u64) -> FocusTimer<TokioClock> {
    FocusTimer::new(TimerEngine::new(TokioClock::new(), duration_secs))
}

fn drain(rx: &mut mpsc::UnboundedReceiver<TimerEvent>) -> Vec<TimerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn ticks(events: &[TimerEvent]) -> Vec<u64> {
    events
        .iter()
        .filter_map(|e| match e {
            TimerEvent::Tick(rem) => Some(*rem),
            TimerEvent::Completed { .. } => None,
        })
        .collect()
}

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

// ---------------------------------------------------------------------------
// Driver on a paused clock
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn pause_time_does_not_count() {
    let mut timer = make_timer(10);
    let mut rx = timer.subscribe();

    assert!(timer.start());
    sleep_ms(4_500).await;
    assert!(timer.pause());
    assert_eq!(timer.snapshot().remaining_secs, 6);

    // Five seconds paused.
    sleep_ms(5_000).await;
    assert_eq!(timer.snapshot().remaining_secs, 6);
    assert!(timer.resume());

    // 9.9s of running time so far.
    sleep_ms(5_400).await;
    let snapshot = timer.snapshot();
    assert_eq!(snapshot.phase, TimerPhase::Running);
    assert_eq!(snapshot.remaining_secs, 1);

    sleep_ms(1_100).await;
    let events = drain(&mut rx);
    assert_eq!(ticks(&events), vec![9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, TimerEvent::Completed { .. }))
            .count(),
        1
    );
    assert_eq!(
        events.last(),
        Some(&TimerEvent::Completed {
            epoch: timer.snapshot().epoch
        })
    );
    assert_eq!(timer.snapshot().phase, TimerPhase::Completed);
}

#[tokio::test(start_paused = true)]
async fn completed_timer_stays_silent_and_restarts_fresh() {
    let mut timer = make_timer(2);
    let mut rx = timer.subscribe();
    timer.start();
    sleep_ms(2_500).await;
    assert!(matches!(
        drain(&mut rx).last(),
        Some(TimerEvent::Completed { .. })
    ));

    sleep_ms(5_000).await;
    assert!(drain(&mut rx).is_empty());

    assert!(timer.start());
    assert_eq!(timer.snapshot().remaining_secs, 2);
    sleep_ms(1_500).await;
    assert_eq!(drain(&mut rx), vec![TimerEvent::Tick(1)]);
}

#[tokio::test(start_paused = true)]
async fn changing_duration_mid_run_stops_old_countdown() {
    let mut timer = make_timer(25 * 60);
    let mut rx = timer.subscribe();
    timer.start();
    sleep_ms(3_500).await;

    assert!(timer.set_duration(45 * 60));
    let snapshot = timer.snapshot();
    assert_eq!(snapshot.phase, TimerPhase::Idle);
    assert_eq!(snapshot.remaining_secs, 45 * 60);
    assert!(!timer.is_ticking());

    drain(&mut rx);
    sleep_ms(10_000).await;
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn invalid_controls_are_rejected() {
    let mut timer = make_timer(30);
    assert!(!timer.pause());
    assert!(!timer.resume());
    assert!(!timer.reset());
    assert!(timer.start());
    assert!(!timer.start());
    assert!(!timer.resume());
    assert!(timer.pause());
    assert!(!timer.pause());
    assert!(timer.reset());
    assert_eq!(timer.snapshot().phase, TimerPhase::Idle);
}

// ---------------------------------------------------------------------------
// Engine with a manual clock
// ---------------------------------------------------------------------------

#[test]
fn late_tick_reports_wall_clock_remaining() {
    let clock = ManualClock::new(0);
    let mut engine = TimerEngine::new(clock.clone(), 10);
    assert!(engine.start());

    // A single tick after a long stall catches up in one step.
    clock.advance(7_400);
    assert_eq!(engine.tick(), TickOutcome::Ticked(3));
    clock.advance(10_000);
    assert_eq!(engine.tick(), TickOutcome::Completed);
    assert_eq!(engine.tick(), TickOutcome::Inactive);
    assert_eq!(engine.remaining_secs(), 0);
}

// ---------------------------------------------------------------------------
// Session cycle
// ---------------------------------------------------------------------------

#[test]
fn session_cycle_with_long_break_and_stats() {
    let settings = FocusSettings::default();
    let mut tracker = FocusTracker::default();
    let mut kinds = Vec::new();
    let mut t = 0;
    for _ in 0..8 {
        let kind = tracker.next_kind();
        let minutes = FocusTracker::minutes_for(kind, 25, &settings);
        t += i64::from(minutes) * 60;
        tracker.record_completion(kind, minutes, DateTime::from_timestamp(t, 0).unwrap());
        kinds.push(kind);
    }

    assert_eq!(
        kinds,
        vec![
            SessionKind::Focus,
            SessionKind::ShortBreak,
            SessionKind::Focus,
            SessionKind::ShortBreak,
            SessionKind::Focus,
            SessionKind::ShortBreak,
            SessionKind::Focus,
            SessionKind::LongBreak,
        ]
    );
    let stats = tracker.stats();
    assert_eq!(stats.sessions, 4);
    assert_eq!(stats.focus_minutes, 100);
    assert_eq!(stats.distractions_blocked, 12);
    assert_eq!(tracker.recent(1).next().unwrap().duration, 15);
}
