use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::model::cell::{Cell, Field};
use crate::model::mandala::GRID_SLOTS;
use crate::tui::app::{App, Mode};
use crate::util::unicode;

use super::helpers::{grid_areas, with_cursor};

/// Render all 81 cells: the root grid in the middle block, each main cell's
/// grid in the block at that main cell's slot
pub fn render_overview(frame: &mut Frame, app: &App, area: Rect) {
    let blocks = grid_areas(area);
    let mandala = app.workspace.mandala();
    let (cursor_row, cursor_col) = app.overview_cursor;

    for (block_slot, &(block_row, block_col)) in GRID_SLOTS.iter().enumerate() {
        let center = match block_slot {
            0 => &mandala.root,
            k => match mandala.root.children.get(k - 1) {
                Some(main) => main,
                None => continue,
            },
        };
        let holds_cursor = cursor_row / 3 == block_row && cursor_col / 3 == block_col;
        let cursor_inner = holds_cursor.then_some((cursor_row % 3, cursor_col % 3));
        render_block(
            frame,
            app,
            blocks[block_row][block_col],
            center,
            block_slot == 0,
            cursor_inner,
        );
    }
}

fn render_block(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    center: &Cell,
    is_root: bool,
    cursor: Option<(usize, usize)>,
) {
    let theme = &app.theme;
    let border_color = if cursor.is_some() {
        theme.selection_border
    } else if is_root {
        theme.center
    } else {
        theme.border
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color).bg(theme.background))
        .style(Style::default().bg(theme.background));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cells = grid_areas(inner);
    for (slot, &(row, col)) in GRID_SLOTS.iter().enumerate() {
        let cell = match slot {
            0 => Some(center),
            k => center.children.get(k - 1),
        };
        let Some(cell) = cell else {
            continue;
        };
        render_mini_cell(
            frame,
            app,
            cells[row][col],
            cell,
            slot == 0,
            cursor == Some((row, col)),
        );
    }
}

fn render_mini_cell(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    cell: &Cell,
    is_center: bool,
    is_cursor: bool,
) {
    let theme = &app.theme;
    let width = area.width as usize;
    if width == 0 || area.height == 0 {
        return;
    }
    let bg = if is_cursor {
        theme.selection_bg
    } else {
        theme.background
    };
    // A cell under edit shows the buffer of the field being edited
    let editing = app.mode == Mode::Edit
        && [Field::Title, Field::Content]
            .into_iter()
            .any(|field| app.workspace.editor().is_editing(&cell.id, field));
    if editing {
        render_mini_edit(frame, app, area, bg);
        return;
    }

    let mut style = Style::default().bg(bg);
    style = if cell.title.is_empty() {
        style.fg(theme.dim)
    } else if is_center {
        style.fg(theme.center).add_modifier(Modifier::BOLD)
    } else if is_cursor {
        style.fg(theme.text_bright)
    } else {
        style.fg(theme.text)
    };

    let text = if cell.title.is_empty() {
        "\u{00B7}".to_string()
    } else {
        cell.title.clone()
    };
    let mut lines: Vec<Line> = unicode::wrap_to_width(&text, width)
        .into_iter()
        .take(area.height as usize)
        .map(|l| Line::from(Span::styled(l, style)))
        .collect();
    // Mark truncation on the last visible line
    let total = unicode::wrap_to_width(&text, width).len();
    if total > lines.len()
        && let Some(last) = lines.last_mut()
    {
        let shown: String = last.spans.iter().map(|s| s.content.as_ref()).collect();
        *last = Line::from(Span::styled(
            unicode::truncate_to_width(&format!("{shown}\u{2026}"), width),
            style,
        ));
    }

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
}

/// Draw the edit buffer with its cursor, scrolled so the cursor line shows
fn render_mini_edit(frame: &mut Frame, app: &App, area: Rect, bg: Color) {
    let style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::UNDERLINED);
    let text = with_cursor(&app.edit_buffer, app.edit_cursor);
    let wrapped = unicode::wrap_to_width(&text, area.width as usize);
    let cursor_line = wrapped
        .iter()
        .position(|l| l.contains('\u{258C}'))
        .unwrap_or(0);
    let skip = (cursor_line + 1).saturating_sub(area.height as usize);
    let lines: Vec<Line> = wrapped
        .into_iter()
        .skip(skip)
        .take(area.height as usize)
        .map(|l| Line::from(Span::styled(l, style)))
        .collect();
    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
}
