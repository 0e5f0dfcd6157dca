mod confirm;
mod edit;
mod navigate;
mod prompt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Mode};

use confirm::handle_confirm;
use edit::{handle_edit, insert_text};
use navigate::handle_navigate;
use prompt::handle_prompt;

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }

    // Ctrl+C always quits; an open edit is committed first
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        if app.mode == Mode::Edit {
            app.commit_edit();
        }
        app.should_quit = true;
        return;
    }

    let key = normalize_key(key);
    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Edit => handle_edit(app, key),
        Mode::Prompt => handle_prompt(app, key),
        Mode::Confirm => handle_confirm(app, key),
        Mode::Loading => {}
    }
}

/// Handle a bracketed paste. Only the edit buffer and the import prompt take
/// text; titles get newlines folded to spaces.
pub fn handle_paste(app: &mut App, text: &str) {
    if text.is_empty() {
        return;
    }
    match app.mode {
        Mode::Edit => {
            let single_line = app
                .edit_target()
                .is_some_and(|(_, field)| !field.is_multiline());
            if single_line {
                let clean = text.replace("\r\n", " ").replace(['\n', '\r'], " ");
                insert_text(app, &clean);
            } else {
                insert_text(app, &text.replace("\r\n", "\n"));
            }
        }
        Mode::Prompt => {
            let clean = text.lines().next().unwrap_or_default();
            app.prompt_input.push_str(clean.trim());
        }
        _ => {}
    }
}

/// Shifted letters arrive as lowercase + SHIFT on some terminals; fold them
/// to the uppercase char with SHIFT removed.
fn normalize_key(mut key: KeyEvent) -> KeyEvent {
    if let KeyCode::Char(c) = key.code
        && key.modifiers.contains(KeyModifiers::SHIFT)
    {
        key.code = KeyCode::Char(c.to_ascii_uppercase());
        key.modifiers.remove(KeyModifiers::SHIFT);
    }
    key
}

#[cfg(test)]
pub(crate) mod test_keys {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    pub fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    pub fn ch(c: char) -> KeyEvent {
        key(KeyCode::Char(c))
    }

    pub fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}
