//! Integration tests for saving and restoring state across restarts.
//!
//! Uses a `FileStore` in a temporary directory and rebuilds the app from it
//! to check that the board order, blockers, sessions and settings survive,
//! and that damaged files never stop the app from starting.
//!
//! Verification command: `cargo test --test persistence`

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use chrono::DateTime;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tempfile::TempDir;

use focusprep::app::{App, SharedClock};
use focusprep::board::{BoardRead, DragEndEvent};
use focusprep::clock::ManualClock;
use focusprep::config::AppConfig;
use focusprep::state::{AppAction, AppStore};
use focusprep::store::{FileStore, KeyValueStore, load_tasks};
use focusprep_proto::codec::{APP_STATE_KEY, BLOCKERS_KEY, SESSIONS_KEY, TASKS_KEY};
use focusprep_proto::session::SessionKind;
use focusprep_proto::settings::{ThemeMode, UserProfile};
use focusprep_proto::task::{TaskDraft, TaskId, TaskStatus};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const START_MS: u64 = 1_720_000_000_000;

fn open(dir: &TempDir) -> Arc<FileStore> {
    Arc::new(FileStore::open(dir.path()).unwrap())
}

fn make_app(store: Arc<FileStore>) -> App {
    let clock: SharedClock = Arc::new(ManualClock::new(START_MS));
    let config = AppConfig {
        data_dir: None,
        ..AppConfig::default()
    };
    App::new(&config, store, clock)
}

fn add(app: &mut App, title: &str, status: TaskStatus) {
    let due = DateTime::from_timestamp_millis(i64::try_from(START_MS).unwrap()).unwrap()
        + chrono::TimeDelta::days(1);
    app.board
        .add_task(TaskDraft::new(title, due).with_status(status))
        .unwrap();
}

fn titles(app: &App) -> Vec<(String, TaskStatus)> {
    app.board
        .tasks()
        .iter()
        .map(|t| (t.title.clone(), t.status))
        .collect()
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

#[test]
fn board_order_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let expected = {
        let mut app = make_app(open(&dir));
        add(&mut app, "Read chapter 4", TaskStatus::Todo);
        add(&mut app, "Lab report", TaskStatus::InProgress);
        add(&mut app, "Flashcards", TaskStatus::Todo);
        let first = app.board.tasks()[0].id.clone();
        app.board
            .on_drag_end(&DragEndEvent::onto_column(&first, TaskStatus::Done));
        titles(&app)
    };

    let app = make_app(open(&dir));
    assert_eq!(titles(&app), expected);
    assert_eq!(
        expected,
        vec![
            ("Lab report".to_string(), TaskStatus::InProgress),
            ("Flashcards".to_string(), TaskStatus::Todo),
            ("Read chapter 4".to_string(), TaskStatus::Done),
        ]
    );
}

#[test]
fn saved_tasks_use_documented_json_shape() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);
    let mut app = make_app(Arc::clone(&store));
    add(&mut app, "Essay", TaskStatus::InProgress);

    let text = std::fs::read_to_string(dir.path().join(format!("{TASKS_KEY}.json"))).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    let task = &json[0];
    assert_eq!(task["title"], "Essay");
    assert_eq!(task["status"], "in-progress");
    assert_eq!(task["priority"], "medium");
    assert!(task["dueDate"].is_string());
    assert!(task["createdAt"].is_string());
    assert!(task["updatedAt"].is_string());
}

#[test]
fn damaged_task_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);
    store.set(TASKS_KEY, "{ definitely not a task list").unwrap();
    let app = make_app(Arc::clone(&store));
    assert!(app.board.is_empty());
    assert!(load_tasks(store.as_ref()).is_empty());
}

#[test]
fn duplicate_ids_in_saved_file_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);
    {
        let mut app = make_app(Arc::clone(&store));
        add(&mut app, "Only", TaskStatus::Todo);
    }
    let text = store.get(TASKS_KEY).unwrap().unwrap();
    let mut json: serde_json::Value = serde_json::from_str(&text).unwrap();
    let copy = json[0].clone();
    json.as_array_mut().unwrap().push(copy);
    store.set(TASKS_KEY, &json.to_string()).unwrap();

    assert!(load_tasks(store.as_ref()).is_empty());
}

/// A task list as the browser build saves it: short ids, camelCase keys.
fn browser_tasks(updated_at: &str) -> String {
    format!(
        r#"[
  {{"id":"1","title":"Read chapter 4","dueDate":"2024-07-10T12:00:00.000Z",
    "priority":"high","status":"todo","tags":["Reading"],
    "createdAt":"2024-07-01T09:00:00.000Z","updatedAt":"2024-07-01T09:00:00.000Z"}},
  {{"id":"2","title":"Lab report","dueDate":"2024-07-12T12:00:00.000Z",
    "priority":"medium","status":"todo","tags":[],
    "createdAt":"2024-07-01T09:00:00.000Z","updatedAt":"{updated_at}"}}
]"#
    )
}

#[test]
fn browser_style_ids_load_and_drag() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);
    store
        .set(TASKS_KEY, &browser_tasks("2024-07-02T09:00:00.000Z"))
        .unwrap();

    let loaded = load_tasks(store.as_ref());
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].id, TaskId::from("1"));

    let mut app = make_app(Arc::clone(&store));
    let event = DragEndEvent {
        active: "2".to_string(),
        over: Some("1".to_string()),
    };
    assert!(app.board.on_drag_end(&event));
    assert_eq!(
        titles(&app),
        vec![
            ("Lab report".to_string(), TaskStatus::Todo),
            ("Read chapter 4".to_string(), TaskStatus::Todo),
        ]
    );

    let text = store.get(TASKS_KEY).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json[0]["id"], "2");
    assert_eq!(json[1]["id"], "1");
}

#[test]
fn extreme_saved_timestamp_survives_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);
    store
        .set(TASKS_KEY, &browser_tasks("+262142-12-31T23:59:59.999Z"))
        .unwrap();

    let mut app = make_app(Arc::clone(&store));
    let id = TaskId::from("2");
    let before = app.board.get(&id).unwrap().updated_at;
    assert!(app.board.move_to_column(&id, TaskStatus::Done));

    let moved = app.board.get(&id).unwrap();
    assert_eq!(moved.status, TaskStatus::Done);
    assert!(moved.updated_at >= before);
}

// ---------------------------------------------------------------------------
// Focus state
// ---------------------------------------------------------------------------

#[test]
fn blockers_and_sessions_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut app = make_app(open(&dir));
        app.handle_key_event(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));
        app.handle_key_event(KeyEvent::new(KeyCode::Char('b'), KeyModifiers::NONE));
    }
    assert!(dir.path().join(format!("{BLOCKERS_KEY}.json")).exists());

    let app = make_app(open(&dir));
    assert!(!app.focus.blockers()[0].enabled);
    assert_eq!(app.focus.enabled_blockers(), 2);
    assert!(app.focus.sessions().is_empty());
    assert!(!dir.path().join(format!("{SESSIONS_KEY}.json")).exists());
    assert_eq!(app.session_kind, SessionKind::Focus);
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[test]
fn theme_and_profile_survive_restart_until_logout() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);
    {
        let mut state = AppStore::load(Arc::clone(&store) as Arc<dyn KeyValueStore>);
        state.dispatch(AppAction::SetTheme(ThemeMode::Light));
        state.dispatch(AppAction::SetUser(UserProfile {
            id: "1".to_string(),
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
        }));
    }

    let mut state = AppStore::load(Arc::clone(&store) as Arc<dyn KeyValueStore>);
    assert_eq!(state.state().theme, ThemeMode::Light);
    assert!(state.state().is_authenticated);

    state.dispatch(AppAction::Logout);
    assert!(!dir.path().join(format!("{APP_STATE_KEY}.json")).exists());
    let state = AppStore::load(store);
    assert!(state.state().user.is_none());
    assert_eq!(state.state().theme, ThemeMode::System);
}

#[test]
fn cli_theme_overrides_saved_theme() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);
    AppStore::load(Arc::clone(&store) as Arc<dyn KeyValueStore>)
        .dispatch(AppAction::SetTheme(ThemeMode::Light));

    let clock: SharedClock = Arc::new(ManualClock::new(START_MS));
    let config = AppConfig {
        data_dir: None,
        theme: Some(ThemeMode::Dark),
        ..AppConfig::default()
    };
    let app = App::new(&config, store, clock);
    assert_eq!(app.state.state().theme, ThemeMode::Dark);
}
