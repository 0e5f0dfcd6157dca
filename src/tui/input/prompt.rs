use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;

/// Import path prompt
pub(super) fn handle_prompt(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_import_prompt(),
        KeyCode::Enter => app.start_import(),
        KeyCode::Backspace => {
            app.prompt_input.pop();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.prompt_input.clear();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.prompt_input.push(c);
        }
        _ => {}
    }
}
