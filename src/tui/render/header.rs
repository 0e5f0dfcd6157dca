use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::cell::Cell;
use crate::ops::navigation::DisplayMode;
use crate::tui::app::App;
use crate::util::unicode;

use super::helpers::spans_width;

/// Render the header: breadcrumb of the grid on screen + display mode,
/// with a separator line below
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // breadcrumb
            Constraint::Length(1), // separator
        ])
        .split(area);

    render_breadcrumb(frame, app, chunks[0]);

    let separator = "\u{2500}".repeat(chunks[1].width as usize);
    frame.render_widget(
        Paragraph::new(separator)
            .style(Style::default().fg(app.theme.dim).bg(app.theme.background)),
        chunks[1],
    );
}

fn render_breadcrumb(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let crumb_style = Style::default().fg(app.theme.text).bg(bg);
    let current_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let sep_style = Style::default().fg(app.theme.dim).bg(bg);

    let mut spans: Vec<Span> = vec![
        Span::styled(" ", Style::default().bg(bg)),
        Span::styled("\u{25C6}", Style::default().fg(app.theme.highlight).bg(bg)),
        Span::styled(" ", Style::default().bg(bg)),
    ];

    let mandala = app.workspace.mandala();
    let expanded = app
        .workspace
        .navigation()
        .expanded()
        .and_then(|id| mandala.main_index(id))
        .and_then(|i| mandala.root.children.get(i));

    // The overview always shows the whole tree
    let expanded = expanded.filter(|_| app.workspace.display() == DisplayMode::Grid);
    match expanded {
        None => {
            spans.push(Span::styled(crumb_label(&mandala.root, "Mandala"), current_style));
        }
        Some(main) => {
            spans.push(Span::styled(crumb_label(&mandala.root, "Mandala"), crumb_style));
            spans.push(Span::styled(" \u{203A} ", sep_style));
            spans.push(Span::styled(
                format!("{} {}", main.label, crumb_label(main, "")).trim_end().to_string(),
                current_style,
            ));
        }
    }

    let mode = match app.workspace.display() {
        DisplayMode::Grid => "grid",
        DisplayMode::Overview => "overview",
    };
    let hint = format!("{mode} ");
    let hint_width = unicode::display_width(&hint);
    let content_width = spans_width(&spans);
    if content_width + hint_width < width {
        spans.push(Span::styled(
            " ".repeat(width - content_width - hint_width),
            Style::default().bg(bg),
        ));
        spans.push(Span::styled(hint, sep_style));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(bg)),
        area,
    );
}

/// Title of a cell for the breadcrumb, or `fallback` when it has none
fn crumb_label(cell: &Cell, fallback: &str) -> String {
    let title = if cell.title.is_empty() {
        fallback
    } else {
        cell.title.as_str()
    };
    unicode::truncate_to_width(title, 32)
}
