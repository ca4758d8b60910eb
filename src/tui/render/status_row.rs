use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;
use crate::util::unicode;

const KEY_HINTS: &str = " j/k move  enter open  e/E editor  q quit";

/// Render the status row (bottom of screen): the last message if any,
/// otherwise key hints
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let line = if let Some(ref message) = app.message {
        Line::from(Span::styled(
            format!(" {}", unicode::truncate_to_width(message, width.saturating_sub(1))),
            Style::default().fg(app.theme.text_bright).bg(bg),
        ))
    } else if app.show_key_hints {
        Line::from(Span::styled(
            unicode::truncate_to_width(KEY_HINTS, width),
            Style::default().fg(app.theme.dim).bg(bg),
        ))
    } else {
        Line::from(Span::styled(" ".repeat(width), Style::default().bg(bg)))
    };

    let paragraph = Paragraph::new(line).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
