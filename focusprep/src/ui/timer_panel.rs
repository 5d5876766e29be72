//! Focus timer, blockers and session history.

use focusprep_proto::session::FOCUS_PRESETS_MINUTES;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
};

use super::{format_clock, theme};
use crate::app::{App, PanelFocus};
use crate::timer::TimerPhase;

/// Render the timer panel.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.panel == PanelFocus::Timer;
    let block = Block::default()
        .title(Span::styled(" Focus ", theme::panel_title(theme::TIMER_TITLE)))
        .borders(Borders::ALL)
        .border_style(if is_focused {
            theme::highlighted()
        } else {
            Style::default()
        });
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Clock
            Constraint::Length(1), // Progress
            Constraint::Length(1), // Presets
            Constraint::Min(3),    // Blockers
            Constraint::Length(6), // Stats and history
        ])
        .split(inner);

    render_clock(frame, chunks[0], app);
    render_progress(frame, chunks[1], app);
    render_presets(frame, chunks[2], app);
    render_blockers(frame, chunks[3], app, is_focused);
    render_history(frame, chunks[4], app);
}

fn render_clock(frame: &mut Frame, area: Rect, app: &App) {
    let snapshot = app.timer_snapshot();
    let phase_color = match snapshot.phase {
        TimerPhase::Running => theme::SUCCESS,
        TimerPhase::Paused => theme::WARNING,
        TimerPhase::Idle | TimerPhase::Completed => theme::FG_SECONDARY,
    };
    let lines = vec![
        Line::styled(app.session_kind.label(), theme::bold()).centered(),
        Line::styled(format_clock(snapshot.remaining_secs), theme::highlighted()).centered(),
        Line::styled(snapshot.phase.to_string(), Style::default().fg(phase_color)).centered(),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_progress(frame: &mut Frame, area: Rect, app: &App) {
    let progress = (app.timer_snapshot().progress() / 100.0).clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(theme::TIMER_TITLE))
        .ratio(progress);
    frame.render_widget(gauge, area);
}

fn render_presets(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    for (i, minutes) in FOCUS_PRESETS_MINUTES.iter().enumerate() {
        let style = if *minutes == app.focus_minutes {
            theme::selected()
        } else {
            theme::dimmed()
        };
        spans.push(Span::styled(format!(" {}:{minutes}m ", i + 1), style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)).centered(), area);
}

fn render_blockers(frame: &mut Frame, area: Rect, app: &App, is_focused: bool) {
    let items: Vec<ListItem> = app
        .focus
        .blockers()
        .iter()
        .enumerate()
        .map(|(i, blocker)| {
            let (mark, color) = if blocker.enabled {
                ("[x]", theme::SUCCESS)
            } else {
                ("[ ]", theme::FG_SECONDARY)
            };
            let name_style = if is_focused && i == app.selected_blocker {
                theme::selected()
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(mark, Style::default().fg(color)),
                Span::raw(format!(" {} ", blocker.icon)),
                Span::styled(blocker.name.clone(), name_style),
            ]))
        })
        .collect();

    let title = format!(" Blockers ({} on) ", app.focus.enabled_blockers());
    let block = Block::default()
        .title(Span::styled(title, theme::dimmed()))
        .borders(Borders::TOP);
    frame.render_widget(List::new(items).block(block), area);
}

fn render_history(frame: &mut Frame, area: Rect, app: &App) {
    let stats = app.focus.stats();
    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{} sessions", stats.sessions), theme::bold()),
        Span::styled(
            format!(
                " · {} min · {} blocked",
                stats.focus_minutes, stats.distractions_blocked
            ),
            theme::dimmed(),
        ),
    ])];
    for session in app.focus.recent(3) {
        lines.push(Line::styled(
            format!(
                "{} {} · {} min",
                session.end_time.format("%H:%M"),
                session.kind.label(),
                session.duration
            ),
            theme::dimmed(),
        ));
    }
    let auto = if app.state.state().settings.auto_start_breaks {
        "auto breaks on"
    } else {
        "auto breaks off"
    };
    lines.push(Line::styled(auto, theme::dimmed()));

    let block = Block::default()
        .title(Span::styled(" History ", theme::dimmed()))
        .borders(Borders::TOP);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
