//! Plain-text rendering of a [`RenderedTable`].

use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use super::Cell;
use super::HeaderCell;
use super::RenderedRow;
use super::RenderedTable;
use super::PLACEHOLDER;

/// Cells wider than this are truncated with an ellipsis.
pub const MAX_CELL_WIDTH: usize = 40;

pub fn display_width(s: &str) -> usize {
    s.width()
}

pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if display_width(s) <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let target_width = max_width - 1;
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > target_width {
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result.push('…');
    result
}

fn pad_to_width(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(s));
    format!("{}{}", s, " ".repeat(fill))
}

/// Text of a header cell; sortable headers carry a `↕` marker.
pub fn header_text(cell: &HeaderCell) -> String {
    match cell {
        HeaderCell::Column {
            label,
            sortable: true,
            ..
        } => format!("{} ↕", label),
        HeaderCell::Column { label, .. } | HeaderCell::Actions { label } => label.clone(),
    }
}

/// Text of a body cell.
pub fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Text(text) => text.clone(),
        Cell::Placeholder => PLACEHOLDER.to_string(),
        Cell::Actions(buttons) => buttons
            .iter()
            .map(|b| {
                if b.icon.is_empty() {
                    format!("[{}]", b.label)
                } else {
                    format!("[{} {}]", b.icon, b.label)
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Renders the table as an aligned text grid.
///
/// ```text
/// | Title ↕ | Stock |
/// |---------|-------|
/// | Chair   | 4     |
/// ```
pub fn render_text(table: &RenderedTable) -> String {
    let header: Vec<String> = table
        .header
        .iter()
        .map(|h| truncate_to_width(&header_text(h), MAX_CELL_WIDTH))
        .collect();

    let body: Vec<Result<Vec<String>, &str>> = table
        .rows
        .iter()
        .map(|row| match row {
            RenderedRow::Data { cells, .. } => Ok(cells
                .iter()
                .map(|c| truncate_to_width(&cell_text(c), MAX_CELL_WIDTH))
                .collect()),
            RenderedRow::Empty { message, .. } => Err(message.as_str()),
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| display_width(h)).collect();
    for cells in body.iter().flatten() {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(display_width(cell));
        }
    }

    let mut lines = vec![format_line(&header, &widths), separator(&widths)];
    for row in &body {
        match row {
            Ok(cells) => lines.push(format_line(cells, &widths)),
            Err(message) => {
                // Spans every column and its separators.
                let inner = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);
                let message = truncate_to_width(message, inner);
                lines.push(format!("| {} |", pad_to_width(&message, inner)));
            }
        }
    }
    lines.join("\n")
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| pad_to_width(cell, *width))
        .collect();
    format!("| {} |", padded.join(" | "))
}

fn separator(widths: &[usize]) -> String {
    let dashes: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
    format!("|{}|", dashes.join("|"))
}
