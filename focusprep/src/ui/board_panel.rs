//! Kanban board rendering.

use focusprep_proto::task::{Task, TaskStatus, is_due_soon, is_overdue};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use super::theme;
use crate::app::{App, PanelFocus};

/// Render the three board columns side by side.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(area);

    for (index, status) in TaskStatus::ALL.into_iter().enumerate() {
        render_column(frame, columns[index], app, index, status);
    }
}

fn render_column(frame: &mut Frame, area: Rect, app: &App, index: usize, status: TaskStatus) {
    let tasks = app.visible_tasks(status);
    let is_focused = app.panel == PanelFocus::Board && app.cursor.column == index;
    let now = app.now();

    let mut items: Vec<ListItem> = tasks
        .iter()
        .enumerate()
        .map(|(row, task)| {
            let is_cursor = is_focused && app.cursor.row == row;
            let is_dragged = app.dragging.as_ref() == Some(&task.id);
            card(task, now, app.due_soon_window, is_cursor, is_dragged)
        })
        .collect();

    // Drop slot after the last card
    if is_focused && app.dragging.is_some() {
        let style = if app.cursor.row >= tasks.len() {
            theme::selected()
        } else {
            theme::dimmed()
        };
        items.push(ListItem::new(Line::styled("  ┄ drop here ┄", style)));
    }

    let color = theme::column_color(status);
    let title = Line::from(vec![
        Span::styled(format!(" {} ", status.title()), theme::panel_title(color)),
        Span::styled(format!("({}) ", tasks.len()), theme::dimmed()),
    ]);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if is_focused {
            theme::highlighted()
        } else {
            Style::default()
        });

    frame.render_widget(List::new(items).block(block), area);
}

fn card(
    task: &Task,
    now: chrono::DateTime<chrono::Utc>,
    due_soon_window: chrono::TimeDelta,
    is_cursor: bool,
    is_dragged: bool,
) -> ListItem<'static> {
    let title_style = if is_dragged {
        theme::dragging()
    } else if is_cursor {
        theme::selected()
    } else if task.status == TaskStatus::Done {
        theme::dimmed()
    } else {
        theme::bold()
    };

    let marker = if is_dragged { "≡ " } else { "● " };
    let title = Line::from(vec![
        Span::styled(marker, Style::default().fg(theme::priority_color(task.priority))),
        Span::styled(task.title.clone(), title_style),
    ]);

    let due = task.due_date.format("%b %d").to_string();
    let due_span = if is_overdue(task, now) {
        Span::styled(format!("  ! overdue {due}"), Style::default().fg(theme::ERROR))
    } else if is_due_soon(task, now, due_soon_window) {
        Span::styled(format!("  due soon {due}"), Style::default().fg(theme::WARNING))
    } else {
        Span::styled(format!("  due {due}"), theme::dimmed())
    };
    let mut meta = vec![due_span];
    for tag in &task.tags {
        meta.push(Span::styled(format!(" #{tag}"), theme::dimmed()));
    }
    if let Some(assignee) = &task.assignee {
        meta.push(Span::styled(format!(" @{assignee}"), theme::dimmed()));
    }

    ListItem::new(vec![title, Line::from(meta)])
}
