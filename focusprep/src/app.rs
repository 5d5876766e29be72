//! Application state and event handling.
//!
//! `App` wires the board, the focus timer, the session tracker and the
//! application store together and translates key presses into calls on
//! them. Drag and drop is done with the keyboard: `Space` picks the
//! selected card up, the cursor picks a drop target (a card, or the empty
//! slot at the end of a column), and `Space` again produces the same
//! [`DragEndEvent`] a pointer drop would.

use std::sync::Arc;

use chrono::TimeDelta;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use focusprep_proto::codec::{BLOCKERS_KEY, SESSIONS_KEY, TASKS_KEY};
use focusprep_proto::session::{DistractionBlocker, FOCUS_PRESETS_MINUTES, FocusSession, SessionKind};
use focusprep_proto::settings::{NotificationKind, SettingsPatch};
use focusprep_proto::task::{Priority, Task, TaskDraft, TaskId, TaskPatch, TaskStatus};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::board::{Board, BoardRead, BoardStats, DragEndEvent, TaskFilter};
use crate::clock::Clock;
use crate::config::AppConfig;
use crate::focus::FocusTracker;
use crate::state::{AppAction, AppStore};
use crate::store::{KeyValueStore, load_or_default, load_tasks, save_logged};
use crate::timer::{FocusTimer, TimerEngine, TimerEvent, TimerSnapshot};

/// Clock shared by the board, the timer and the app.
pub type SharedClock = Arc<dyn Clock>;

/// How far ahead a quick-added task is due.
const QUICK_ADD_DUE_IN: TimeDelta = TimeDelta::days(1);

/// Which panel is currently focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    /// The kanban board (default).
    Board,
    /// The focus timer and blockers.
    Timer,
}

/// What typed characters currently go to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    /// Keys are commands.
    Normal,
    /// Typing the title of a new task for the given column.
    AddingTask(TaskStatus),
    /// Typing a new title for an existing task.
    EditingTitle(TaskId),
    /// Typing a search query; the board filters as you type.
    Searching,
}

/// Selected position on the board, in terms of the visible (filtered) cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardCursor {
    /// Column index into [`TaskStatus::ALL`].
    pub column: usize,
    /// Row within that column. While dragging, `row == len` is the drop
    /// slot after the last card.
    pub row: usize,
}

impl BoardCursor {
    /// Status of the selected column.
    #[must_use]
    pub fn status(&self) -> TaskStatus {
        TaskStatus::ALL[self.column.min(TaskStatus::ALL.len() - 1)]
    }
}

/// Main application state.
pub struct App {
    /// The kanban board.
    pub board: Board<SharedClock>,
    /// The focus timer.
    pub timer: FocusTimer<SharedClock>,
    /// Blockers, session log and break cycle.
    pub focus: FocusTracker,
    /// Theme, profile, notifications and settings.
    pub state: AppStore,
    /// Which panel is focused.
    pub panel: PanelFocus,
    /// Current input mode.
    pub mode: InputMode,
    /// Current text input.
    pub input: String,
    /// Cursor position in input (character index).
    pub cursor_position: usize,
    /// Selected board position.
    pub cursor: BoardCursor,
    /// Card currently picked up, if any.
    pub dragging: Option<TaskId>,
    /// What the board shows.
    pub filter: TaskFilter,
    /// Kind of the session loaded into the timer.
    pub session_kind: SessionKind,
    /// Selected focus length in minutes.
    pub focus_minutes: u32,
    /// Selected blocker row in the timer panel.
    pub selected_blocker: usize,
    /// Cards due within this window are flagged.
    pub due_soon_window: TimeDelta,
    /// Whether the app should quit.
    pub should_quit: bool,
    store: Arc<dyn KeyValueStore>,
    clock: SharedClock,
    timer_events: mpsc::UnboundedReceiver<TimerEvent>,
}

impl App {
    /// Builds the app from saved state in `store`.
    #[must_use]
    pub fn new(config: &AppConfig, store: Arc<dyn KeyValueStore>, clock: SharedClock) -> Self {
        let mut board = Board::with_tasks(Arc::clone(&clock), load_tasks(store.as_ref()))
            .with_max_title_len(config.max_task_title_len);
        let saver = Arc::clone(&store);
        board.subscribe(move |_, tasks| {
            save_logged(saver.as_ref(), TASKS_KEY, tasks);
        });

        let mut blockers: Vec<DistractionBlocker> = load_or_default(store.as_ref(), BLOCKERS_KEY);
        if blockers.is_empty() {
            blockers = DistractionBlocker::defaults();
        }
        let sessions: Vec<FocusSession> = load_or_default(store.as_ref(), SESSIONS_KEY);
        let focus = FocusTracker::new(blockers, sessions);

        let mut state = AppStore::load(Arc::clone(&store));
        if let Some(theme) = config.theme {
            state.dispatch(AppAction::SetTheme(theme));
        }

        let focus_minutes = config
            .focus_minutes
            .unwrap_or(state.state().settings.default_focus_duration)
            .max(1);
        let engine = TimerEngine::new(Arc::clone(&clock), u64::from(focus_minutes) * 60);
        let timer = FocusTimer::with_period(engine, config.tick_interval);
        let timer_events = timer.subscribe();

        info!(
            tasks = board.len(),
            sessions = focus.sessions().len(),
            focus_minutes,
            "app state loaded"
        );

        Self {
            board,
            timer,
            focus,
            state,
            panel: PanelFocus::Board,
            mode: InputMode::Normal,
            input: String::new(),
            cursor_position: 0,
            cursor: BoardCursor::default(),
            dragging: None,
            filter: TaskFilter::default(),
            session_kind: SessionKind::Focus,
            focus_minutes,
            selected_blocker: 0,
            due_soon_window: config.due_soon_window,
            should_quit: false,
            store,
            clock,
            timer_events,
        }
    }

    /// The app's notion of "now".
    #[must_use]
    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now_utc()
    }

    /// Counts shown in the header.
    #[must_use]
    pub fn stats(&self) -> BoardStats {
        self.board.stats(self.now())
    }

    /// Timer state for rendering.
    #[must_use]
    pub fn timer_snapshot(&self) -> TimerSnapshot {
        self.timer.snapshot()
    }

    /// Cards shown in `status`'s column under the current filter.
    #[must_use]
    pub fn visible_tasks(&self, status: TaskStatus) -> Vec<&Task> {
        self.board.filtered_column(status, &self.filter)
    }

    /// The card under the cursor.
    #[must_use]
    pub fn selected_task(&self) -> Option<&Task> {
        self.visible_tasks(self.cursor.status())
            .get(self.cursor.row)
            .copied()
    }

    /// Periodic work: apply timer events and expire notifications.
    ///
    /// A completion is only acted on while the timer is still in the run
    /// that produced it; a key press in between wins.
    pub fn tick(&mut self) {
        while let Ok(event) = self.timer_events.try_recv() {
            let TimerEvent::Completed { epoch } = event else {
                continue;
            };
            if epoch == self.timer.snapshot().epoch {
                self.finish_session();
            } else {
                debug!(epoch, "stale timer completion dropped");
            }
        }
        let now = self.now();
        self.state.expire(now);
    }

    /// Handle a key event.
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
            self.should_quit = true;
            return;
        }

        if self.mode != InputMode::Normal {
            self.handle_input_key(key);
            return;
        }

        // Global shortcuts
        match key.code {
            KeyCode::Esc if self.dragging.is_some() => {
                self.cancel_drag();
                return;
            }
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.cancel_drag();
                self.panel = match self.panel {
                    PanelFocus::Board => PanelFocus::Timer,
                    PanelFocus::Timer => PanelFocus::Board,
                };
                return;
            }
            KeyCode::Char('t') => {
                let theme = self.state.state().theme.toggled();
                self.state.dispatch(AppAction::SetTheme(theme));
                return;
            }
            KeyCode::Char('x') => {
                if let Some(id) = self.state.state().notifications.first().map(|n| n.id) {
                    self.state.dispatch(AppAction::RemoveNotification(id));
                }
                return;
            }
            _ => {}
        }

        match self.panel {
            PanelFocus::Board => self.handle_board_key(key),
            PanelFocus::Timer => self.handle_timer_key(key),
        }
    }

    // -----------------------------------------------------------------------
    // Board
    // -----------------------------------------------------------------------

    fn handle_board_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor_column(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor_column(1),
            KeyCode::Up | KeyCode::Char('k') => self.cursor.row = self.cursor.row.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                self.cursor.row += 1;
                self.clamp_cursor();
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if self.dragging.is_some() {
                    self.drop_dragged();
                } else {
                    self.pick_up();
                }
            }
            _ if self.dragging.is_some() => {}
            KeyCode::Char('[') => self.shift_selected(-1),
            KeyCode::Char(']') => self.shift_selected(1),
            KeyCode::Char('a') => self.begin_input(InputMode::AddingTask(self.cursor.status()), ""),
            KeyCode::Char('e') => {
                if let Some(task) = self.selected_task() {
                    let (id, title) = (task.id.clone(), task.title.clone());
                    self.begin_input(InputMode::EditingTitle(id), &title);
                }
            }
            KeyCode::Char('+') => self.cycle_selected_priority(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Char('/') => {
                let query = self.filter.search.clone();
                self.begin_input(InputMode::Searching, &query);
            }
            KeyCode::Char('f') => {
                self.filter.priority = match self.filter.priority {
                    None => Some(Priority::High),
                    Some(Priority::High) => Some(Priority::Medium),
                    Some(Priority::Medium) => Some(Priority::Low),
                    Some(Priority::Low) => None,
                };
                self.clamp_cursor();
            }
            _ => {}
        }
    }

    fn move_cursor_column(&mut self, delta: isize) {
        let last = TaskStatus::ALL.len() - 1;
        self.cursor.column = self.cursor.column.saturating_add_signed(delta).min(last);
        self.clamp_cursor();
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible_tasks(self.cursor.status()).len();
        // The slot after the last card is only a valid target while dragging.
        let max = if self.dragging.is_some() {
            len
        } else {
            len.saturating_sub(1)
        };
        self.cursor.row = self.cursor.row.min(max);
    }

    fn pick_up(&mut self) {
        if let Some(task) = self.selected_task() {
            debug!(id = %task.id, "card picked up");
            self.dragging = Some(task.id.clone());
        }
    }

    fn cancel_drag(&mut self) {
        let Some(id) = self.dragging.take() else {
            return;
        };
        // Dropped outside any target.
        self.board.on_drag_end(&DragEndEvent::cancelled(&id));
        self.clamp_cursor();
    }

    /// The drop target id under the cursor: the card there, or the column.
    fn drop_target(&self) -> String {
        let status = self.cursor.status();
        self.visible_tasks(status)
            .get(self.cursor.row)
            .map_or_else(|| status.column_id().to_string(), |t| t.id.to_string())
    }

    fn drop_dragged(&mut self) {
        let Some(id) = self.dragging.take() else {
            return;
        };
        let before = self.board.get(&id).map(|t| t.status);
        let event = DragEndEvent {
            active: id.to_string(),
            over: Some(self.drop_target()),
        };
        if self.board.on_drag_end(&event) {
            self.after_status_change(&id, before);
            self.select_task(&id);
        } else {
            self.clamp_cursor();
        }
    }

    fn shift_selected(&mut self, delta: isize) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let (id, from) = (task.id.clone(), task.status);
        let Some(index) = TaskStatus::ALL.iter().position(|s| *s == from) else {
            return;
        };
        let Some(to) = index
            .checked_add_signed(delta)
            .and_then(|i| TaskStatus::ALL.get(i).copied())
        else {
            return;
        };
        if self.board.move_to_column(&id, to) {
            self.after_status_change(&id, Some(from));
            self.select_task(&id);
        }
    }

    fn after_status_change(&mut self, id: &TaskId, before: Option<TaskStatus>) {
        let Some(task) = self.board.get(id) else {
            return;
        };
        if before == Some(task.status) {
            return;
        }
        let message = format!("\"{}\" moved to {}", task.title, task.status.title());
        self.notify(NotificationKind::Info, "Task Status Updated", &message);
    }

    /// Moves the cursor onto `id` if it is visible.
    fn select_task(&mut self, id: &TaskId) {
        for (column, status) in TaskStatus::ALL.into_iter().enumerate() {
            let found = self.visible_tasks(status).iter().position(|t| t.id == *id);
            if let Some(row) = found {
                self.cursor = BoardCursor { column, row };
                return;
            }
        }
        self.clamp_cursor();
    }

    fn cycle_selected_priority(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let id = task.id.clone();
        let priority = match task.priority {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        };
        let patch = TaskPatch {
            priority: Some(priority),
            ..TaskPatch::default()
        };
        self.apply_edit(&id, &patch);
    }

    fn delete_selected(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let (id, title) = (task.id.clone(), task.title.clone());
        if self.board.delete_task(&id) {
            self.notify(NotificationKind::Info, "Task Deleted", &format!("\"{title}\" removed"));
            self.clamp_cursor();
        }
    }

    fn apply_edit(&mut self, id: &TaskId, patch: &TaskPatch) {
        match self.board.edit_task(id, patch) {
            Ok(true) => {
                self.notify(NotificationKind::Info, "Task Updated", "Changes saved");
                self.select_task(id);
            }
            Ok(false) => {}
            Err(e) => self.notify(NotificationKind::Error, "Invalid task", &e.to_string()),
        }
    }

    fn add_from_input(&mut self, status: TaskStatus, text: &str) {
        let due = self.now() + QUICK_ADD_DUE_IN;
        let draft = parse_quick_add(text, due).with_status(status);
        match self.board.add_task(draft) {
            Ok(task) => {
                let message = format!("\"{}\" added to {}", task.title, status.title());
                self.notify(NotificationKind::Success, "Task Created", &message);
                self.select_task(&task.id);
            }
            Err(e) => self.notify(NotificationKind::Error, "Invalid task", &e.to_string()),
        }
    }

    // -----------------------------------------------------------------------
    // Text input
    // -----------------------------------------------------------------------

    fn begin_input(&mut self, mode: InputMode, initial: &str) {
        self.mode = mode;
        self.input = initial.to_string();
        self.cursor_position = self.input.chars().count();
    }

    fn end_input(&mut self) -> String {
        self.mode = InputMode::Normal;
        self.cursor_position = 0;
        std::mem::take(&mut self.input)
    }

    /// Handle key event while typing.
    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_input(),
            KeyCode::Esc => {
                if self.mode == InputMode::Searching {
                    self.filter.search.clear();
                }
                self.end_input();
                self.clamp_cursor();
            }
            KeyCode::Char(c) => self.enter_char(c),
            KeyCode::Backspace => self.delete_char(),
            KeyCode::Left => self.cursor_position = self.cursor_position.saturating_sub(1),
            KeyCode::Right => {
                self.cursor_position = (self.cursor_position + 1).min(self.input.chars().count());
            }
            KeyCode::Home => self.cursor_position = 0,
            KeyCode::End => self.cursor_position = self.input.chars().count(),
            _ => {}
        }
        if self.mode == InputMode::Searching {
            self.filter.search.clone_from(&self.input);
            self.clamp_cursor();
        }
    }

    fn submit_input(&mut self) {
        let mode = self.mode.clone();
        let text = self.end_input();
        match mode {
            InputMode::AddingTask(status) => self.add_from_input(status, &text),
            InputMode::EditingTitle(id) => {
                let patch = TaskPatch {
                    title: Some(text.trim().to_string()),
                    ..TaskPatch::default()
                };
                self.apply_edit(&id, &patch);
            }
            InputMode::Searching => {
                self.filter.search = text;
                self.clamp_cursor();
            }
            InputMode::Normal => {}
        }
    }

    /// Insert a character at the cursor position.
    fn enter_char(&mut self, c: char) {
        let at = byte_index(&self.input, self.cursor_position);
        self.input.insert(at, c);
        self.cursor_position += 1;
    }

    /// Delete the character before the cursor.
    fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let at = byte_index(&self.input, self.cursor_position - 1);
            self.input.remove(at);
            self.cursor_position -= 1;
        }
    }

    // -----------------------------------------------------------------------
    // Timer
    // -----------------------------------------------------------------------

    fn handle_timer_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(' ' | 's') | KeyCode::Enter => {
                self.timer.toggle();
            }
            KeyCode::Char('r') => {
                self.timer.reset();
            }
            KeyCode::Char(c @ '1'..='4') => {
                let index = c.to_digit(10).map_or(0, |d| d as usize - 1);
                if let Some(minutes) = FOCUS_PRESETS_MINUTES.get(index) {
                    self.select_focus_minutes(*minutes);
                }
            }
            KeyCode::Char('a') => {
                let auto = !self.state.state().settings.auto_start_breaks;
                self.state.dispatch(AppAction::UpdateSettings(SettingsPatch {
                    auto_start_breaks: Some(auto),
                    ..SettingsPatch::default()
                }));
            }
            KeyCode::Char('n') => {
                self.focus.skip_to_focus();
                self.session_kind = SessionKind::Focus;
                self.load_session();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_blocker = self.selected_blocker.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let last = self.focus.blockers().len().saturating_sub(1);
                self.selected_blocker = (self.selected_blocker + 1).min(last);
            }
            KeyCode::Char('b') => self.toggle_selected_blocker(),
            _ => {}
        }
    }

    /// Chooses a focus length and loads a fresh focus session of that length.
    pub fn select_focus_minutes(&mut self, minutes: u32) {
        self.focus_minutes = minutes.max(1);
        self.focus.skip_to_focus();
        self.session_kind = SessionKind::Focus;
        self.load_session();
    }

    /// Minutes of the session loaded into the timer.
    #[must_use]
    pub fn session_minutes(&self) -> u32 {
        FocusTracker::minutes_for(
            self.session_kind,
            self.focus_minutes,
            &self.state.state().settings,
        )
    }

    fn load_session(&mut self) {
        let secs = u64::from(self.session_minutes()) * 60;
        self.timer.set_duration(secs);
    }

    fn toggle_selected_blocker(&mut self) {
        let Some(id) = self
            .focus
            .blockers()
            .get(self.selected_blocker)
            .map(|b| b.id.clone())
        else {
            return;
        };
        if self.focus.toggle_blocker(&id) {
            save_logged(self.store.as_ref(), BLOCKERS_KEY, self.focus.blockers());
        }
    }

    fn finish_session(&mut self) {
        let now = self.now();
        let minutes = self.session_minutes();
        let session = self.focus.record_completion(self.session_kind, minutes, now);
        save_logged(self.store.as_ref(), SESSIONS_KEY, self.focus.sessions());
        info!(kind = session.kind.label(), minutes, "session complete");

        let message = match session.kind {
            SessionKind::Focus => format!(
                "{minutes} min focus session done, {} distractions blocked",
                session.distractions_avoided
            ),
            SessionKind::ShortBreak | SessionKind::LongBreak => {
                format!("{} over, back to work", session.kind.label())
            }
        };
        self.notify(NotificationKind::Success, "Session Complete", &message);

        self.session_kind = self.focus.next_kind();
        self.load_session();
        if self.focus.auto_start_next(&self.state.state().settings) {
            self.timer.start();
        }
    }

    fn notify(&mut self, kind: NotificationKind, title: &str, message: &str) {
        let now = self.now();
        self.state.notify_user(kind, title, message, now);
    }
}

/// Builds a draft from quick-add text: `#word` tokens become tags and
/// `!high`, `!medium`, `!low` set the priority. Everything else is the title.
#[must_use]
pub fn parse_quick_add(text: &str, due: chrono::DateTime<chrono::Utc>) -> TaskDraft {
    let mut title_words = Vec::new();
    let mut tags = Vec::new();
    let mut priority = Priority::default();
    for word in text.split_whitespace() {
        match word {
            "!high" => priority = Priority::High,
            "!medium" => priority = Priority::Medium,
            "!low" => priority = Priority::Low,
            w if w.len() > 1 && w.starts_with('#') => tags.push(&w[1..]),
            w => title_words.push(w),
        }
    }
    let mut draft = TaskDraft::new(title_words.join(" "), due).with_priority(priority);
    for tag in tags {
        draft.add_tag(tag);
    }
    draft
}

fn byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices().nth(char_index).map_or(s.len(), |(i, _)| i)
}
