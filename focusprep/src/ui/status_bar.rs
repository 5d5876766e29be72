//! Header and status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, InputMode, PanelFocus};

/// Render the one-line header with board counts.
pub fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let stats = app.stats();
    let mut spans = vec![
        Span::styled(
            concat!("FocusPrep v", env!("CARGO_PKG_VERSION")),
            theme::bold(),
        ),
        Span::raw(" | "),
        Span::raw(format!(
            "{} tasks · {} to do · {} in progress · {} done",
            stats.total, stats.todo, stats.in_progress, stats.done
        )),
    ];
    if stats.overdue > 0 {
        spans.push(Span::styled(
            format!(" · {} overdue", stats.overdue),
            Style::default().fg(theme::ERROR),
        ));
    }
    if !app.filter.is_empty() {
        let mut filter = String::from(" | filter:");
        if !app.filter.search.is_empty() {
            filter.push_str(&format!(" \"{}\"", app.filter.search));
        }
        if let Some(priority) = app.filter.priority {
            filter.push_str(&format!(" {priority}"));
        }
        spans.push(Span::styled(filter, theme::highlighted()));
    }
    if let Some(user) = &app.state.state().user {
        spans.push(Span::styled(format!(" | {}", user.name), theme::dimmed()));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}

/// Render the status bar at the bottom of the screen: the input line or the
/// newest notification, then key help.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let top = match &app.mode {
        InputMode::Normal => notification_line(app),
        mode => input_line(app, mode),
    };

    let help_text = match (&app.mode, app.panel) {
        (InputMode::Normal, PanelFocus::Board) if app.dragging.is_some() => {
            "←→↑↓: choose target | Space/Enter: drop | Esc: cancel"
        }
        (InputMode::Normal, PanelFocus::Board) => {
            "a: add | e: edit | d: delete | Space: drag | [ ]: move | +: priority | /: search | f: filter | t: theme | Tab: timer | q: quit"
        }
        (InputMode::Normal, PanelFocus::Timer) => {
            "Space: start/pause | r: reset | 1-4: length | n: skip break | ↑↓ b: blockers | a: auto breaks | Tab: board | q: quit"
        }
        (InputMode::Searching, _) => "Type to filter | Enter: keep | Esc: clear",
        _ => "Enter: save | Esc: cancel | #tag !high !low",
    };

    let lines = vec![top, Line::styled(help_text, theme::dimmed())];
    let paragraph = Paragraph::new(lines).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}

fn notification_line(app: &App) -> Line<'static> {
    let state = app.state.state();
    let Some(latest) = state.notifications.first() else {
        return Line::raw("");
    };
    let unread = state.unread_count();
    let color = theme::notification_color(latest.kind);
    let mut spans = vec![
        Span::styled("● ", Style::default().fg(color)),
        Span::styled(latest.title.clone(), theme::panel_title(color)),
        Span::raw(format!(" {}", latest.message)),
    ];
    if unread > 1 {
        spans.push(Span::styled(format!("  (+{} more, x: dismiss)", unread - 1), theme::dimmed()));
    }
    Line::from(spans)
}

fn input_line(app: &App, mode: &InputMode) -> Line<'static> {
    let prompt = match mode {
        InputMode::AddingTask(status) => format!("New task in {}: ", status.title()),
        InputMode::EditingTitle(_) => "Title: ".to_string(),
        InputMode::Searching => "Search: ".to_string(),
        InputMode::Normal => String::new(),
    };

    // Build the input text with cursor
    let mut display_text: String = app.input.clone();
    let at = display_text
        .char_indices()
        .nth(app.cursor_position)
        .map_or(display_text.len(), |(i, _)| i);
    display_text.insert(at, '█');

    Line::from(vec![
        Span::styled(prompt, theme::highlighted()),
        Span::raw(display_text),
    ])
}
