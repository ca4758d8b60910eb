use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::menu::MenuRow;
use crate::tui::app::App;
use crate::util::unicode;

/// Render the project menu: project headers, their repositories beneath.
/// Adjusts `app.scroll_offset` so the cursor stays visible.
pub fn render_menu(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let bg_style = Style::default().bg(bg);
    let width = area.width as usize;
    let height = area.height as usize;

    if app.rows.is_empty() {
        let hint = " No projects yet. Add one with `dock project add <name>`.";
        let line = Line::from(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
        frame.render_widget(Paragraph::new(line).style(bg_style), area);
        return;
    }

    app.scroll_offset = app.scroll_offset.min(app.rows.len().saturating_sub(height));
    if let Some(cursor) = app.cursor {
        if cursor < app.scroll_offset {
            app.scroll_offset = cursor;
        } else if height > 0 && cursor >= app.scroll_offset + height {
            app.scroll_offset = cursor + 1 - height;
        }
    }

    // Name column sized to the widest repository, capped at half the row
    let name_w = app
        .rows
        .iter()
        .filter(|r| matches!(r, MenuRow::Repository { .. }))
        .map(|r| unicode::display_width(&r.label()))
        .max()
        .unwrap_or(0)
        .min(width / 2);

    let lines: Vec<Line> = app
        .rows
        .iter()
        .enumerate()
        .skip(app.scroll_offset)
        .take(height)
        .map(|(i, row)| menu_line(app, row, app.cursor == Some(i), name_w, width))
        .collect();

    frame.render_widget(Paragraph::new(lines).style(bg_style), area);
}

fn menu_line<'a>(app: &App, row: &MenuRow, selected: bool, name_w: usize, width: usize) -> Line<'a> {
    let theme = &app.theme;
    let row_bg = if selected { theme.selection_bg } else { theme.background };
    let pad_style = Style::default().bg(row_bg);

    let mut spans: Vec<Span> = Vec::new();
    match row {
        MenuRow::Project { name, .. } => {
            spans.push(Span::styled(
                format!(" {}", unicode::truncate_to_width(name, width.saturating_sub(2))),
                Style::default()
                    .fg(theme.text_bright)
                    .bg(row_bg)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        MenuRow::Repository {
            description,
            launchable,
            ..
        } => {
            let indicator = if selected { " \u{25B6} " } else { "   " };
            spans.push(Span::styled(indicator, Style::default().fg(theme.highlight).bg(row_bg)));

            let label = unicode::pad_to_width(&row.label(), name_w);
            let name_style = if !launchable {
                Style::default().fg(theme.dim).bg(row_bg)
            } else if selected {
                Style::default()
                    .fg(theme.text_bright)
                    .bg(row_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text).bg(row_bg)
            };
            spans.push(Span::styled(label, name_style));

            if !description.is_empty() {
                let budget = width.saturating_sub(3 + name_w + 2 + 1);
                spans.push(Span::styled(
                    format!("  {}", unicode::truncate_to_width(description, budget)),
                    Style::default().fg(theme.dim).bg(row_bg),
                ));
            }
        }
        MenuRow::Empty => {
            spans.push(Span::styled(
                format!("   {}", row.label()),
                Style::default()
                    .fg(theme.dim)
                    .bg(row_bg)
                    .add_modifier(Modifier::ITALIC),
            ));
        }
    }

    let used: usize = spans.iter().map(|s| unicode::display_width(&s.content)).sum();
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), pad_style));
    }
    Line::from(spans)
}
