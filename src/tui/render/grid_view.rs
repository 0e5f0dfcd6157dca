use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::model::cell::{Cell, CellKind, Field};
use crate::model::mandala::GRID_SLOTS;
use crate::tui::app::{App, Mode};
use crate::util::unicode;

use super::helpers::{CONTENT_PLACEHOLDER, field_text, grid_areas, title_placeholder};

/// Render the nine-cell grid on screen: the current center and its 8 children
pub fn render_grid_view(frame: &mut Frame, app: &App, area: Rect) {
    let areas = grid_areas(area);
    let cells = app.workspace.visible_cells();

    for (slot, cell) in cells.iter().enumerate() {
        let Some(&(row, col)) = GRID_SLOTS.get(slot) else {
            continue;
        };
        let is_cursor = app.cursor == (row, col);
        render_cell(frame, app, areas[row][col], cell, slot == 0, is_cursor);
    }
}

fn render_cell(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    cell: &Cell,
    is_grid_center: bool,
    is_cursor: bool,
) {
    let theme = &app.theme;
    let bg = if is_cursor {
        theme.selection_bg
    } else {
        theme.background
    };
    let kind = app
        .workspace
        .mandala()
        .kind_of(&cell.id)
        .unwrap_or(CellKind::Sub);

    let border_color = if is_cursor {
        theme.selection_border
    } else if is_grid_center {
        theme.center
    } else {
        theme.border
    };
    let label_color = if is_grid_center {
        theme.center
    } else {
        theme.highlight
    };

    let mut block_title = vec![Span::styled(
        format!(" {} ", cell_label(cell, kind)),
        Style::default()
            .fg(label_color)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )];
    // Outer cells of the root grid open their own grid
    if kind == CellKind::Main && !is_grid_center && cell.has_children() {
        block_title.push(Span::styled("\u{25B8} ", Style::default().fg(theme.dim).bg(bg)));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if is_cursor {
            BorderType::Thick
        } else {
            BorderType::Rounded
        })
        .border_style(Style::default().fg(border_color).bg(bg))
        .title(Line::from(block_title))
        .style(Style::default().bg(bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width as usize;
    if width == 0 || inner.height == 0 {
        return;
    }

    let editing = |field: Field| {
        (app.mode == Mode::Edit && app.workspace.editor().is_editing(&cell.id, field))
            .then_some((app.edit_buffer.as_str(), app.edit_cursor))
    };

    let mut lines: Vec<Line> = Vec::new();

    let (title, title_empty) = field_text(cell, Field::Title, editing(Field::Title));
    let title_style = if title_empty {
        Style::default()
            .fg(theme.dim)
            .bg(bg)
            .add_modifier(Modifier::ITALIC)
    } else {
        Style::default()
            .fg(if is_grid_center {
                theme.center
            } else {
                theme.text_bright
            })
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    };
    let title = if title_empty {
        title_placeholder(cell, kind)
    } else {
        title
    };
    for line in unicode::wrap_to_width(&title, width) {
        lines.push(Line::from(Span::styled(line, title_style)));
    }

    lines.push(Line::from(""));

    let (content, content_empty) = field_text(cell, Field::Content, editing(Field::Content));
    if content_empty {
        lines.push(Line::from(Span::styled(
            CONTENT_PLACEHOLDER,
            Style::default()
                .fg(theme.dim)
                .bg(bg)
                .add_modifier(Modifier::ITALIC),
        )));
    } else {
        let content_style = Style::default().fg(theme.text).bg(bg);
        for line in unicode::wrap_to_width(&content, width) {
            lines.push(Line::from(Span::styled(line, content_style)));
        }
    }

    // Keep the edit cursor on screen in a short cell
    let height = inner.height as usize;
    let scroll = lines
        .iter()
        .rposition(|l| l.spans.iter().any(|s| s.content.contains('\u{258C}')))
        .map_or(0, |i| (i + 1).saturating_sub(height));

    frame.render_widget(
        Paragraph::new(lines)
            .style(Style::default().bg(bg))
            .scroll((scroll as u16, 0)),
        inner,
    );
}

/// Rank shown in the border: the root has no rank symbol
fn cell_label(cell: &Cell, kind: CellKind) -> &str {
    match kind {
        CellKind::Center => "\u{25C9}",
        _ => cell.label.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::cell::CellId;
    use crate::model::mandala::Mandala;
    use crate::tui::render::test_helpers::*;

    fn draw(app: &App) -> String {
        render_to_string(90, 30, |frame, area| {
            render_grid_view(frame, app, area);
        })
    }

    #[test]
    fn root_grid_shows_center_and_mains() {
        let app = placeholder_app();
        let output = draw(&app);
        assert!(output.contains("Central theme"));
        assert!(output.contains("What this mandala is about"));
        for i in 1..=8 {
            assert!(output.contains(&format!("Theme {i}")), "missing Theme {i}");
        }
        assert!(!output.contains("idea"));
    }

    #[test]
    fn expanded_grid_shows_subs() {
        let mut app = placeholder_app();
        app.cursor = (1, 0); // slot 2: second main cell
        app.activate_cursor();
        let output = draw(&app);
        assert!(output.contains("Theme 2"));
        assert!(output.contains("idea 8"));
        assert!(!output.contains("Central theme"));
    }

    #[test]
    fn empty_cells_show_placeholders() {
        let mut app = placeholder_app();
        app.workspace.replace_tree(Mandala::blank());
        let output = draw(&app);
        assert!(output.contains("Add center theme"));
        assert!(output.contains("theme"));
        assert!(output.contains("Add notes"));
    }

    #[test]
    fn editing_shows_buffer_with_cursor() {
        let mut app = placeholder_app();
        app.begin_edit(Field::Title);
        app.edit_buffer = "Draft".into();
        app.edit_cursor = 5;
        let output = draw(&app);
        assert!(output.contains("Draft\u{258C}"));
        assert!(!output.contains("Central theme"));
        assert!(app.workspace.editor().is_editing(&CellId::center(), Field::Title));
    }
}
