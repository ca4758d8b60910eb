pub mod menu_view;
pub mod status_row;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use crate::ops::editor_registry::EditorRegistry;
use crate::util::unicode;

use super::app::App;

/// Main render function: header, menu, status row
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // title + blank
            Constraint::Min(1),    // menu
            Constraint::Length(1), // status row
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    menu_view::render_menu(frame, app, chunks[1]);
    status_row::render_status_row(frame, app, chunks[2]);
}

/// App name on the left, current editor on the right
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let title = " repodock";
    let entry = EditorRegistry::entry(app.preference.selected);
    let editor = if app.preference.selected.is_custom() && !app.preference.custom_command.trim().is_empty() {
        format!("editor: {} ", app.preference.custom_command.trim())
    } else {
        format!("editor: {} ", entry.display_name)
    };

    let mut spans = vec![Span::styled(
        title,
        Style::default()
            .fg(app.theme.highlight)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )];
    let used = unicode::display_width(title);
    let editor_w = unicode::display_width(&editor);
    if used + editor_w < width {
        spans.push(Span::styled(
            " ".repeat(width - used - editor_w),
            Style::default().bg(bg),
        ));
        spans.push(Span::styled(editor, Style::default().fg(app.theme.text).bg(bg)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).style(Style::default().bg(bg)), area);
}
