pub mod grid_view;
pub mod header;
pub mod help_overlay;
mod helpers;
pub mod import_error_overlay;
pub mod loading_overlay;
pub mod overview_view;
pub mod status_row;

#[cfg(test)]
pub(crate) mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use crate::ops::navigation::DisplayMode;

use super::app::{App, Mode};

/// Main render function: header, grid or overview, status row, overlays
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: header (2 rows) | content | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // breadcrumb + separator
            Constraint::Min(1),    // content area
            Constraint::Length(1), // status row
        ])
        .split(area);

    header::render_header(frame, app, chunks[0]);

    match app.workspace.display() {
        DisplayMode::Grid => grid_view::render_grid_view(frame, app, chunks[1]),
        DisplayMode::Overview => overview_view::render_overview(frame, app, chunks[1]),
    }

    if app.show_help {
        help_overlay::render_help_overlay(frame, app, frame.area());
    }

    if app.mode == Mode::Prompt {
        import_error_overlay::render_import_error_overlay(frame, app, frame.area());
    }

    if app.mode == Mode::Loading {
        loading_overlay::render_loading_overlay(frame, app, frame.area());
    }

    status_row::render_status_row(frame, app, chunks[2]);
}
