use std::sync::Arc;

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::ai::HttpOptimizer;
use crate::io::store::MemoryStore;
use crate::model::mandala::Mandala;
use crate::model::settings::Settings;
use crate::ops::workspace::Workspace;
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// An app over the starter mandala, backed by memory, with AI off.
pub fn placeholder_app() -> App {
    let workspace = Workspace::new(Mandala::placeholder(), Box::new(MemoryStore::default()));
    App::new(
        workspace,
        Settings::default(),
        Arc::new(HttpOptimizer::new()),
        std::env::temp_dir(),
    )
}

#[test]
fn placeholder_app_renders_at_default_size() {
    let app = placeholder_app();
    let output = render_to_string(TERM_W, TERM_H, |frame, _area| {
        crate::tui::render::render(frame, &app);
    });
    assert!(output.contains("Central theme"));
}
