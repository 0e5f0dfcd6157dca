use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::tui::app::App;

use super::helpers::centered_rect;

/// Full text of a failed import, drawn above the reopened prompt
pub fn render_import_error_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let Some(detail) = app.import_detail.as_deref() else {
        return;
    };
    let popup = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup);

    let bg = app.theme.background;
    let mut lines: Vec<Line> = Vec::new();
    let mut rest = detail.lines();
    if let Some(first) = rest.next() {
        lines.push(Line::from(Span::styled(
            first.to_string(),
            Style::default()
                .fg(app.theme.red)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        )));
    }
    for line in rest {
        lines.push(Line::from(Span::styled(
            line.to_string(),
            Style::default().fg(app.theme.text).bg(bg),
        )));
    }

    let block = Block::default()
        .title(" Import failed ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.red).bg(bg))
        .style(Style::default().bg(bg));
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block),
        popup,
    );
}
