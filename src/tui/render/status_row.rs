use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, ConfirmAction, Mode};
use crate::util::unicode;

use super::helpers::spans_width;

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let dim = Style::default().fg(app.theme.dim).bg(bg);

    let (mut spans, hint): (Vec<Span>, &str) = match app.mode {
        Mode::Navigate => {
            let hint = if app.settings.ui.show_key_hints {
                "Enter open  e edit  x export  i import  ? help"
            } else {
                "? help"
            };
            (message_spans(app), hint)
        }
        Mode::Edit => {
            let field = app
                .edit_target()
                .map_or("", |(_, field)| field.name());
            let hint = if app.edit_target().is_some_and(|(_, f)| f.is_multiline()) {
                "Ctrl+S save  Enter newline  Esc cancel"
            } else {
                "Enter save  Esc cancel"
            };
            (
                vec![Span::styled(
                    format!(" -- EDIT {field} --"),
                    Style::default().fg(app.theme.highlight).bg(bg),
                )],
                hint,
            )
        }
        Mode::Prompt => {
            let mut spans = vec![
                Span::styled(" Import: ", Style::default().fg(app.theme.highlight).bg(bg)),
                Span::styled(
                    app.prompt_input.clone(),
                    Style::default().fg(app.theme.text_bright).bg(bg),
                ),
                Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)),
            ];
            if let Some(status) = &app.status
                && status.is_error
            {
                spans.push(Span::styled(
                    format!("  {}", status.text),
                    Style::default().fg(app.theme.red).bg(bg),
                ));
            }
            (spans, "Enter import  Esc cancel")
        }
        Mode::Confirm => {
            let question = match app.confirm {
                Some(ConfirmAction::ClearScope) => " Clear every cell in this grid? (y/n)",
                Some(ConfirmAction::ClearAll) => " Clear the whole mandala? (y/n)",
                None => "",
            };
            (
                vec![Span::styled(
                    question,
                    Style::default().fg(app.theme.yellow).bg(bg),
                )],
                "",
            )
        }
        Mode::Loading => (
            vec![Span::styled(" Optimizing with AI\u{2026}", dim)],
            "",
        ),
    };

    let content_width = spans_width(&spans);
    let hint_width = unicode::display_width(hint);
    if !hint.is_empty() && content_width + hint_width + 1 < width {
        let padding = width - content_width - hint_width - 1;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint, dim));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// The last status or error message, if any
fn message_spans(app: &App) -> Vec<Span<'static>> {
    let bg = app.theme.background;
    match &app.status {
        Some(status) => {
            let color = if status.is_error {
                app.theme.red
            } else {
                app.theme.green
            };
            vec![Span::styled(
                format!(" {}", status.text),
                Style::default().fg(color).bg(bg),
            )]
        }
        None => Vec::new(),
    }
}
