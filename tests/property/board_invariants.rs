//! Property-based tests for board invariants.
//!
//! Uses proptest to verify, over random sequences of board operations:
//! 1. The columns always partition the task sequence, each in global order.
//! 2. Task ids stay unique.
//! 3. Reordering and moving only permute the sequence.
//! 4. An ignored drop leaves the board exactly as it was.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::HashSet;

use chrono::TimeDelta;
use proptest::prelude::*;

use focusprep::board::{Board, BoardRead, DragAction, DragEndEvent, resolve_drag_end};
use focusprep::clock::{Clock, ManualClock};
use focusprep_proto::task::{TaskDraft, TaskId, TaskStatus};

// --- Operations ---

#[derive(Debug, Clone)]
enum Op {
    Add(TaskStatus),
    Move(usize, TaskStatus),
    Reorder(usize, usize),
    DropOnColumn(usize, TaskStatus),
    DropOnTask(usize, usize),
    Cancel(usize),
    Delete(usize),
}

fn arb_status() -> impl Strategy<Value = TaskStatus> {
    prop::sample::select(TaskStatus::ALL.to_vec())
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => arb_status().prop_map(Op::Add),
        2 => (any::<usize>(), arb_status()).prop_map(|(i, s)| Op::Move(i, s)),
        2 => (any::<usize>(), any::<usize>()).prop_map(|(i, j)| Op::Reorder(i, j)),
        2 => (any::<usize>(), arb_status()).prop_map(|(i, s)| Op::DropOnColumn(i, s)),
        2 => (any::<usize>(), any::<usize>()).prop_map(|(i, j)| Op::DropOnTask(i, j)),
        1 => any::<usize>().prop_map(Op::Cancel),
        1 => any::<usize>().prop_map(Op::Delete),
    ]
}

/// Picks an existing task id by index, or a fresh unknown id on an empty board.
fn pick(board: &Board<ManualClock>, i: usize) -> TaskId {
    if board.is_empty() {
        TaskId::new()
    } else {
        board.tasks()[i % board.len()].id.clone()
    }
}

fn apply(board: &mut Board<ManualClock>, clock: &ManualClock, op: &Op, n: usize) {
    match op {
        Op::Add(status) => {
            let due = clock.now_utc() + TimeDelta::days(1);
            board
                .add_task(TaskDraft::new(format!("task {n}"), due).with_status(*status))
                .unwrap();
        }
        Op::Move(i, status) => {
            let id = pick(board, *i);
            board.move_to_column(&id, *status);
        }
        Op::Reorder(i, j) => {
            let (a, b) = (pick(board, *i), pick(board, *j));
            board.reorder(&a, &b);
        }
        Op::DropOnColumn(i, status) => {
            let id = pick(board, *i);
            board.on_drag_end(&DragEndEvent::onto_column(&id, *status));
        }
        Op::DropOnTask(i, j) => {
            let (a, b) = (pick(board, *i), pick(board, *j));
            board.on_drag_end(&DragEndEvent::onto_task(&a, &b));
        }
        Op::Cancel(i) => {
            let id = pick(board, *i);
            board.on_drag_end(&DragEndEvent::cancelled(&id));
        }
        Op::Delete(i) => {
            let id = pick(board, *i);
            board.delete_task(&id);
        }
    }
}

fn assert_partition(board: &Board<ManualClock>) {
    let columns = board.columns();
    let total: usize = columns.iter().map(|c| c.tasks.len()).sum();
    assert_eq!(total, board.len());

    for column in &columns {
        assert!(column.tasks.iter().all(|t| t.status == column.status));
        let expected: Vec<&TaskId> = board
            .tasks()
            .iter()
            .filter(|t| t.status == column.status)
            .map(|t| &t.id)
            .collect();
        let actual: Vec<&TaskId> = column.tasks.iter().map(|t| &t.id).collect();
        assert_eq!(actual, expected);
    }

    let ids: HashSet<&TaskId> = board.tasks().iter().map(|t| &t.id).collect();
    assert_eq!(ids.len(), board.len());
}

// --- Properties ---

proptest! {
    #[test]
    fn columns_partition_the_sequence(ops in prop::collection::vec(arb_op(), 0..60)) {
        let clock = ManualClock::new(1_720_000_000_000);
        let mut board = Board::new(clock.clone());
        for (n, op) in ops.iter().enumerate() {
            clock.advance(1_000);
            apply(&mut board, &clock, op, n);
            assert_partition(&board);
        }
    }

    #[test]
    fn reorder_and_drops_only_permute(
        setup in prop::collection::vec(arb_status(), 1..12),
        moves in prop::collection::vec(arb_op(), 0..40),
    ) {
        let clock = ManualClock::new(0);
        let mut board = Board::new(clock.clone());
        for (n, status) in setup.iter().enumerate() {
            apply(&mut board, &clock, &Op::Add(*status), n);
        }
        let mut before: Vec<TaskId> = board.tasks().iter().map(|t| t.id.clone()).collect();
        before.sort_by_key(ToString::to_string);

        for op in moves.iter().filter(|op| !matches!(op, Op::Add(_) | Op::Delete(_))) {
            apply(&mut board, &clock, op, 0);
        }

        let mut after: Vec<TaskId> = board.tasks().iter().map(|t| t.id.clone()).collect();
        after.sort_by_key(ToString::to_string);
        prop_assert_eq!(before, after);
    }

    #[test]
    fn ignored_drop_changes_nothing(
        setup in prop::collection::vec(arb_status(), 0..8),
        active in any::<usize>(),
        target in any::<usize>(),
        unknown_target in any::<bool>(),
    ) {
        let clock = ManualClock::new(0);
        let mut board = Board::new(clock.clone());
        for (n, status) in setup.iter().enumerate() {
            apply(&mut board, &clock, &Op::Add(*status), n);
        }
        let active = pick(&board, active);
        let target = if unknown_target { TaskId::new() } else { pick(&board, target) };
        let event = DragEndEvent::onto_task(&active, &target);

        if let DragAction::Ignored(_) = resolve_drag_end(&board, &event) {
            let before = board.tasks().to_vec();
            clock.advance(5_000);
            prop_assert!(!board.on_drag_end(&event));
            prop_assert_eq!(board.tasks(), before.as_slice());
        }
    }

    #[test]
    fn move_to_column_places_task_last(
        setup in prop::collection::vec(arb_status(), 1..10),
        index in any::<usize>(),
        status in arb_status(),
    ) {
        let clock = ManualClock::new(0);
        let mut board = Board::new(clock.clone());
        for (n, s) in setup.iter().enumerate() {
            apply(&mut board, &clock, &Op::Add(*s), n);
        }
        let id = pick(&board, index);
        let was = board.get(&id).unwrap().status;
        let moved = board.move_to_column(&id, status);

        prop_assert_eq!(moved, was != status);
        if moved {
            prop_assert_eq!(&board.tasks().last().unwrap().id, &id);
            prop_assert_eq!(board.tasks_by_column(status).last().unwrap().id.clone(), id);
        }
    }
}
