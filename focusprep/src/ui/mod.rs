//! Terminal UI rendering.

pub mod board_panel;
pub mod status_bar;
pub mod theme;
pub mod timer_panel;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    widgets::Block,
};

use crate::app::App;

/// Main draw function for the entire UI.
pub fn draw(frame: &mut Frame, app: &App) {
    frame.render_widget(
        Block::default().style(theme::base(app.state.state().theme)),
        frame.area(),
    );

    // Header, content, status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(68), // Board
            Constraint::Percentage(32), // Timer
        ])
        .split(main_chunks[1]);

    status_bar::render_header(frame, main_chunks[0], app);
    board_panel::render(frame, content_chunks[0], app);
    timer_panel::render(frame, content_chunks[1], app);
    status_bar::render(frame, main_chunks[2], app);
}

/// Formats seconds as `MM:SS`.
#[must_use]
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
