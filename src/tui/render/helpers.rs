use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::Span;

use crate::model::cell::{Cell, CellKind, Field};
use crate::util::unicode;

/// Hint shown in place of an empty title
pub(super) fn title_placeholder(cell: &Cell, kind: CellKind) -> String {
    match kind {
        CellKind::Center => "Add center theme".to_string(),
        CellKind::Main => format!("Add {} theme", cell.label),
        CellKind::Sub => format!("Add {} sub-theme", cell.label),
    }
}

/// Hint shown in place of empty content
pub(super) const CONTENT_PLACEHOLDER: &str = "Add notes";

/// The text of a field with a block cursor at byte offset `cursor`
pub(super) fn with_cursor(text: &str, cursor: usize) -> String {
    let cursor = cursor.min(text.len());
    format!("{}\u{258C}{}", &text[..cursor], &text[cursor..])
}

/// Text to show for one field: the edit buffer while it is being edited,
/// else the stored value. The flag is true when the value is empty.
pub(super) fn field_text(
    cell: &Cell,
    field: Field,
    editing: Option<(&str, usize)>,
) -> (String, bool) {
    match editing {
        Some((buffer, cursor)) => (with_cursor(buffer, cursor), false),
        None => {
            let value = cell.field(field);
            (value.to_string(), value.is_empty())
        }
    }
}

/// Compute total display width of a slice of spans
pub(super) fn spans_width(spans: &[Span]) -> usize {
    spans
        .iter()
        .map(|s| unicode::display_width(&s.content))
        .sum()
}

/// Split an area into a 3 x 3 grid, indexed `[row][col]`
pub(super) fn grid_areas(area: Rect) -> [[Rect; 3]; 3] {
    let thirds = [
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ];
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(thirds)
        .split(area);
    let mut out = [[Rect::default(); 3]; 3];
    for (r, row_area) in rows.iter().enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(thirds)
            .split(*row_area);
        for (c, col_area) in cols.iter().enumerate() {
            out[r][c] = *col_area;
        }
    }
    out
}

/// Create a centered rectangle of the given percentage of the parent
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
