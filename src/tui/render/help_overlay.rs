use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::ops::navigation::DisplayMode;
use crate::tui::app::App;

use super::helpers::centered_rect;

/// Render the help overlay (toggled with ?)
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let overlay_area = centered_rect(60, 80, area);
    frame.render_widget(Clear, overlay_area);

    let bg = app.theme.background;
    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(app.theme.text).bg(bg);
    let header_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(" Key Bindings", header_style)));
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(" Navigation", header_style)));
    add_binding(&mut lines, " \u{2190}\u{2193}\u{2191}\u{2192}/hjkl", "Move cursor", key_style, desc_style);
    match app.workspace.display() {
        DisplayMode::Grid => {
            add_binding(
                &mut lines,
                " Enter",
                "Open theme grid / back from center",
                key_style,
                desc_style,
            );
            add_binding(&mut lines, " Tab", "Show all 81 cells", key_style, desc_style);
        }
        DisplayMode::Overview => {
            add_binding(&mut lines, " Enter", "Open grid of cell", key_style, desc_style);
            add_binding(&mut lines, " Tab", "Back to single grid", key_style, desc_style);
        }
    }
    add_binding(&mut lines, " Bksp/u", "Back to center grid", key_style, desc_style);
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(" Editing", header_style)));
    add_binding(&mut lines, " e/t", "Edit title", key_style, desc_style);
    add_binding(&mut lines, " E/d", "Edit notes", key_style, desc_style);
    add_binding(&mut lines, " Enter", "Save title", key_style, desc_style);
    add_binding(&mut lines, " Ctrl+S", "Save notes", key_style, desc_style);
    add_binding(&mut lines, " Tab", "Save and leave field", key_style, desc_style);
    add_binding(&mut lines, " Esc", "Discard edit", key_style, desc_style);
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(" Mandala", header_style)));
    add_binding(&mut lines, " x", "Export outline", key_style, desc_style);
    add_binding(&mut lines, " i", "Import outline file", key_style, desc_style);
    add_binding(&mut lines, " c", "Clear this grid", key_style, desc_style);
    add_binding(&mut lines, " C", "Clear everything", key_style, desc_style);
    add_binding(&mut lines, " ?", "Toggle help", key_style, desc_style);
    add_binding(&mut lines, " q", "Quit", key_style, desc_style);

    let block = Block::default()
        .title(" Help ")
        .title_style(header_style)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, overlay_area);
}

fn add_binding<'a>(
    lines: &mut Vec<Line<'a>>,
    key: &'a str,
    desc: &'a str,
    key_style: Style,
    desc_style: Style,
) {
    let key_width = 16;
    let padded_key = format!("{:<width$}", key, width = key_width);
    lines.push(Line::from(vec![
        Span::styled(padded_key, key_style),
        Span::styled(desc, desc_style),
    ]));
}
