use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width in terminal cells
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to fit within `max_cells` terminal cells, appending `…` if truncated.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if max_cells == 0 {
        return String::new();
    }
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 1 {
        return "\u{2026}".to_string();
    }
    let budget = max_cells - 1; // reserve 1 cell for '…'
    let mut width = 0;
    let mut result = String::new();
    for c in s.chars() {
        let cw = c.width().unwrap_or(0);
        if width + cw > budget {
            break;
        }
        width += cw;
        result.push(c);
    }
    result.push('\u{2026}');
    result
}

/// Left-align `s` in a column `cells` wide, truncating if needed.
pub fn pad_to_width(s: &str, cells: usize) -> String {
    let truncated = truncate_to_width(s, cells);
    let pad = cells.saturating_sub(display_width(&truncated));
    format!("{}{}", truncated, " ".repeat(pad))
}
