use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;

use super::helpers::centered_rect;

/// Shown while an AI rewrite is in flight
pub fn render_loading_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let popup = centered_rect(50, 30, area);
    frame.render_widget(Clear, popup);

    let bg = app.theme.background;
    let file = app
        .pending_import
        .as_ref()
        .and_then(|p| p.path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Restructuring outline with AI\u{2026}",
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(file, Style::default().fg(app.theme.dim).bg(bg))),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.highlight).bg(bg))
        .style(Style::default().bg(bg));
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(block),
        popup,
    );
}
