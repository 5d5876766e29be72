//! Theme and styling constants for the TUI.

use focusprep_proto::settings::{NotificationKind, ThemeMode};
use focusprep_proto::task::{Priority, TaskStatus};
use ratatui::style::{Color, Modifier, Style};

/// Secondary foreground color (dimmed text).
pub const FG_SECONDARY: Color = Color::Gray;

/// Highlight color for focused elements.
pub const HIGHLIGHT: Color = Color::Cyan;

/// Success color.
pub const SUCCESS: Color = Color::Green;

/// Warning / due-soon color.
pub const WARNING: Color = Color::Yellow;

/// Error / overdue color.
pub const ERROR: Color = Color::Red;

/// Color of a card being dragged.
pub const DRAGGING: Color = Color::LightMagenta;

/// Panel title color for the timer panel.
pub const TIMER_TITLE: Color = Color::Magenta;

/// Background for the whole frame. `System` is treated as dark since the
/// terminal gives no reliable preference.
#[must_use]
pub fn base(mode: ThemeMode) -> Style {
    match mode.resolve(true) {
        ThemeMode::Light => Style::default().fg(Color::Black).bg(Color::White),
        ThemeMode::Dark | ThemeMode::System => Style::default().fg(Color::White).bg(Color::Black),
    }
}

/// Dimmed text style (due dates, tags, metadata).
#[must_use]
pub fn dimmed() -> Style {
    Style::default().fg(FG_SECONDARY)
}

/// Bold text style.
#[must_use]
pub fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

/// Highlighted text style (focused panel borders).
#[must_use]
pub fn highlighted() -> Style {
    Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

/// Selected item style (in lists).
#[must_use]
pub fn selected() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Style for the card currently picked up.
#[must_use]
pub fn dragging() -> Style {
    Style::default()
        .fg(DRAGGING)
        .add_modifier(Modifier::BOLD | Modifier::ITALIC)
}

/// Style for the status bar background (dark background with white foreground).
#[must_use]
pub fn status_bar_bg() -> Style {
    Style::default().fg(Color::White).bg(Color::Rgb(30, 30, 50))
}

/// Style for panel titles with a given color (bold).
#[must_use]
pub fn panel_title(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Title color of a board column.
#[must_use]
pub const fn column_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Todo => Color::Blue,
        TaskStatus::InProgress => Color::Yellow,
        TaskStatus::Done => Color::Green,
    }
}

/// Marker color for a priority.
#[must_use]
pub const fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => ERROR,
        Priority::Medium => WARNING,
        Priority::Low => SUCCESS,
    }
}

/// Color for a notification of `kind`.
#[must_use]
pub const fn notification_color(kind: NotificationKind) -> Color {
    match kind {
        NotificationKind::Info => HIGHLIGHT,
        NotificationKind::Success => SUCCESS,
        NotificationKind::Warning => WARNING,
        NotificationKind::Error => ERROR,
    }
}
