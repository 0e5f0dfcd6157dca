use crossterm::event::{KeyCode, KeyEvent};

use crate::model::cell::Field;
use crate::tui::app::{App, ConfirmAction};

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    if app.show_help {
        // Help overlay: ? or Esc closes, everything else is swallowed
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
            app.show_help = false;
        }
        return;
    }

    app.status = None;
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(-1, 0),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(1, 0),
        KeyCode::Left | KeyCode::Char('h') => app.move_cursor(0, -1),
        KeyCode::Right | KeyCode::Char('l') => app.move_cursor(0, 1),

        KeyCode::Enter => app.activate_cursor(),
        KeyCode::Backspace | KeyCode::Char('u') => app.go_to_parent(),
        KeyCode::Tab => app.toggle_overview(),

        KeyCode::Char('e') | KeyCode::Char('t') => app.begin_edit(Field::Title),
        KeyCode::Char('E') | KeyCode::Char('d') => app.begin_edit(Field::Content),

        KeyCode::Char('x') => app.export(),
        KeyCode::Char('i') => app.open_import_prompt(""),
        KeyCode::Char('c') => app.ask_confirm(ConfirmAction::ClearScope),
        KeyCode::Char('C') => app.ask_confirm(ConfirmAction::ClearAll),

        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}
