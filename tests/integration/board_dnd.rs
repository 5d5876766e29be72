//! Integration tests for moving and reordering cards with drop gestures.
//!
//! Drives `Board` only through `DragEndEvent`s and checks the resulting
//! global order, column membership and change notifications.
//!
//! Verification command: `cargo test --test board_dnd`

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;

use focusprep::board::{
    Board, BoardChange, BoardRead, BoardWrite, DragAction, DragEndEvent, IgnoredDrop,
    resolve_drag_end,
};
use focusprep::clock::{Clock, ManualClock};
use focusprep_proto::task::{TaskDraft, TaskId, TaskStatus};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const START_MS: u64 = 1_720_000_000_000;

fn make_board() -> (Board<ManualClock>, ManualClock) {
    let clock = ManualClock::new(START_MS);
    (Board::new(clock.clone()), clock)
}

fn due(clock: &ManualClock) -> DateTime<Utc> {
    clock.now_utc() + TimeDelta::days(2)
}

fn add(board: &mut Board<ManualClock>, clock: &ManualClock, title: &str, status: TaskStatus) -> TaskId {
    board
        .add_task(TaskDraft::new(title, due(clock)).with_status(status))
        .unwrap()
        .id
}

fn column_titles(board: &Board<ManualClock>, status: TaskStatus) -> Vec<String> {
    board
        .tasks_by_column(status)
        .into_iter()
        .map(|t| t.title.clone())
        .collect()
}

fn global_titles(board: &Board<ManualClock>) -> Vec<String> {
    board.tasks().iter().map(|t| t.title.clone()).collect()
}

/// Records every change the board reports.
fn record_changes(board: &mut Board<ManualClock>) -> Arc<Mutex<Vec<BoardChange>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    board.subscribe(move |change, _| sink.lock().push(change.clone()));
    log
}

// ---------------------------------------------------------------------------
// Column drops
// ---------------------------------------------------------------------------

#[test]
fn drop_on_column_moves_and_appends() {
    let (mut board, clock) = make_board();
    let a = add(&mut board, &clock, "A", TaskStatus::Todo);
    add(&mut board, &clock, "B", TaskStatus::Todo);
    add(&mut board, &clock, "C", TaskStatus::Done);
    clock.advance_secs(30);

    assert!(board.on_drag_end(&DragEndEvent::onto_column(&a, TaskStatus::Done)));

    assert_eq!(column_titles(&board, TaskStatus::Todo), vec!["B"]);
    assert_eq!(column_titles(&board, TaskStatus::Done), vec!["C", "A"]);
    assert_eq!(global_titles(&board), vec!["B", "C", "A"]);

    let moved = board.get(&a).unwrap();
    assert_eq!(moved.status, TaskStatus::Done);
    assert_eq!(moved.updated_at - moved.created_at, TimeDelta::seconds(30));
}

#[test]
fn drop_on_own_column_changes_nothing() {
    let (mut board, clock) = make_board();
    let a = add(&mut board, &clock, "A", TaskStatus::Todo);
    add(&mut board, &clock, "B", TaskStatus::Todo);
    let before = board.tasks().to_vec();
    let log = record_changes(&mut board);

    assert!(!board.on_drag_end(&DragEndEvent::onto_column(&a, TaskStatus::Todo)));
    assert_eq!(board.tasks(), before.as_slice());
    assert!(log.lock().is_empty());
}

// ---------------------------------------------------------------------------
// Task drops
// ---------------------------------------------------------------------------

#[test]
fn drop_on_task_in_same_column_reorders() {
    let (mut board, clock) = make_board();
    add(&mut board, &clock, "A", TaskStatus::Todo);
    let b = add(&mut board, &clock, "B", TaskStatus::Todo);
    let c = add(&mut board, &clock, "C", TaskStatus::Todo);

    assert!(board.on_drag_end(&DragEndEvent::onto_task(&c, &b)));
    assert_eq!(column_titles(&board, TaskStatus::Todo), vec!["A", "C", "B"]);
    assert_eq!(board.get(&c).unwrap().status, TaskStatus::Todo);
}

#[test]
fn drop_on_task_in_other_column_moves_to_that_column() {
    let (mut board, clock) = make_board();
    let a = add(&mut board, &clock, "A", TaskStatus::Todo);
    let x = add(&mut board, &clock, "X", TaskStatus::InProgress);
    add(&mut board, &clock, "Y", TaskStatus::InProgress);

    assert_eq!(
        resolve_drag_end(&board, &DragEndEvent::onto_task(&a, &x)),
        DragAction::MoveToColumn {
            id: a.clone(),
            status: TaskStatus::InProgress
        }
    );
    assert!(board.on_drag_end(&DragEndEvent::onto_task(&a, &x)));
    // Appended, not inserted before the target.
    assert_eq!(column_titles(&board, TaskStatus::InProgress), vec!["X", "Y", "A"]);
}

#[test]
fn reorder_uses_post_removal_index_across_interleaved_columns() {
    let (mut board, clock) = make_board();
    let a = add(&mut board, &clock, "A", TaskStatus::Todo);
    add(&mut board, &clock, "P", TaskStatus::Done);
    let b = add(&mut board, &clock, "B", TaskStatus::Todo);
    let c = add(&mut board, &clock, "C", TaskStatus::Todo);

    assert!(board.on_drag_end(&DragEndEvent::onto_task(&a, &c)));
    assert_eq!(global_titles(&board), vec!["P", "B", "A", "C"]);

    // A already sits directly before C.
    assert!(!board.on_drag_end(&DragEndEvent::onto_task(&a, &c)));
    assert_eq!(global_titles(&board), vec!["P", "B", "A", "C"]);

    assert!(board.on_drag_end(&DragEndEvent::onto_task(&c, &b)));
    assert_eq!(global_titles(&board), vec!["P", "C", "B", "A"]);
    assert_eq!(column_titles(&board, TaskStatus::Todo), vec!["C", "B", "A"]);
    assert_eq!(column_titles(&board, TaskStatus::Done), vec!["P"]);
}

// ---------------------------------------------------------------------------
// Ignored drops
// ---------------------------------------------------------------------------

#[test]
fn ignored_drops_leave_board_untouched() {
    let (mut board, clock) = make_board();
    let a = add(&mut board, &clock, "A", TaskStatus::Todo);
    add(&mut board, &clock, "B", TaskStatus::InProgress);
    let before = board.tasks().to_vec();
    let log = record_changes(&mut board);

    let cases = [
        (DragEndEvent::cancelled(&a), IgnoredDrop::NoTarget),
        (DragEndEvent::onto_task(&a, &a), IgnoredDrop::OntoSelf),
        (
            DragEndEvent::onto_column(&TaskId::new(), TaskStatus::Done),
            IgnoredDrop::UnknownActive,
        ),
        (DragEndEvent::onto_task(&a, &TaskId::new()), IgnoredDrop::UnknownTarget),
        (
            DragEndEvent {
                active: a.to_string(),
                over: Some("backlog".to_string()),
            },
            IgnoredDrop::UnknownTarget,
        ),
    ];
    for (event, reason) in cases {
        assert_eq!(resolve_drag_end(&board, &event), DragAction::Ignored(reason));
        assert!(!board.on_drag_end(&event));
    }

    assert_eq!(board.tasks(), before.as_slice());
    assert!(log.lock().is_empty());
}

#[test]
fn stale_event_after_delete_is_ignored() {
    let (mut board, clock) = make_board();
    let a = add(&mut board, &clock, "A", TaskStatus::Todo);
    let b = add(&mut board, &clock, "B", TaskStatus::Todo);
    let event = DragEndEvent::onto_task(&a, &b);

    assert!(board.delete_task(&b));
    assert!(!board.on_drag_end(&event));
    assert_eq!(global_titles(&board), vec!["A"]);
}

// ---------------------------------------------------------------------------
// Notifications and the write trait
// ---------------------------------------------------------------------------

#[test]
fn subscribers_see_moves_and_reorders_with_new_sequence() {
    let (mut board, clock) = make_board();
    let a = add(&mut board, &clock, "A", TaskStatus::Todo);
    let b = add(&mut board, &clock, "B", TaskStatus::Todo);

    let heads = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&heads);
    board.subscribe(move |_, tasks| sink.lock().push(tasks[0].title.clone()));
    let log = record_changes(&mut board);

    board.on_drag_end(&DragEndEvent::onto_task(&b, &a));
    board.on_drag_end(&DragEndEvent::onto_column(&b, TaskStatus::InProgress));

    assert_eq!(
        *log.lock(),
        vec![
            BoardChange::Reordered {
                id: b.clone(),
                before: a.clone()
            },
            BoardChange::Moved {
                id: b,
                from: TaskStatus::Todo,
                to: TaskStatus::InProgress
            },
        ]
    );
    assert_eq!(*heads.lock(), vec!["B".to_string(), "A".to_string()]);
}

fn drop_through_trait(board: &mut impl BoardWrite, event: &DragEndEvent) -> bool {
    board.on_drag_end(event)
}

#[test]
fn works_through_write_trait() {
    let (mut board, clock) = make_board();
    let a = add(&mut board, &clock, "A", TaskStatus::Todo);
    assert!(drop_through_trait(
        &mut board,
        &DragEndEvent::onto_column(&a, TaskStatus::Done)
    ));
    let columns = board.columns();
    assert_eq!(columns.len(), 3);
    assert_eq!(columns[2].status, TaskStatus::Done);
    assert_eq!(columns[2].tasks.len(), 1);
}
