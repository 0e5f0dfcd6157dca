use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;
use crate::util::unicode;

/// Inline edit of a title (single line) or content (multi-line).
///
/// Title: Enter commits. Content: Enter inserts a newline and Ctrl+Enter or
/// Ctrl+S commits. Tab commits (leaving the field), Esc cancels.
pub(super) fn handle_edit(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let multiline = app
        .edit_target()
        .is_some_and(|(_, field)| field.is_multiline());

    match key.code {
        KeyCode::Esc => app.cancel_edit(),
        KeyCode::Tab => app.commit_edit(),
        KeyCode::Char('s') if ctrl => app.commit_edit(),
        KeyCode::Enter if ctrl || !multiline => app.commit_edit(),
        KeyCode::Enter => insert_text(app, "\n"),

        KeyCode::Backspace => {
            if let Some(prev) = unicode::prev_grapheme_boundary(&app.edit_buffer, app.edit_cursor)
            {
                app.edit_buffer.replace_range(prev..app.edit_cursor, "");
                app.edit_cursor = prev;
            }
        }
        KeyCode::Delete => {
            if let Some(next) = unicode::next_grapheme_boundary(&app.edit_buffer, app.edit_cursor)
            {
                app.edit_buffer.replace_range(app.edit_cursor..next, "");
            }
        }
        KeyCode::Left => {
            if let Some(prev) = unicode::prev_grapheme_boundary(&app.edit_buffer, app.edit_cursor)
            {
                app.edit_cursor = prev;
            }
        }
        KeyCode::Right => {
            if let Some(next) = unicode::next_grapheme_boundary(&app.edit_buffer, app.edit_cursor)
            {
                app.edit_cursor = next;
            }
        }
        KeyCode::Home => app.edit_cursor = line_start(&app.edit_buffer, app.edit_cursor),
        KeyCode::End => app.edit_cursor = line_end(&app.edit_buffer, app.edit_cursor),
        KeyCode::Char('a') if ctrl => app.edit_cursor = line_start(&app.edit_buffer, app.edit_cursor),
        KeyCode::Char('e') if ctrl => app.edit_cursor = line_end(&app.edit_buffer, app.edit_cursor),
        KeyCode::Char(c) if !ctrl => {
            let mut buf = [0u8; 4];
            insert_text(app, c.encode_utf8(&mut buf));
        }
        _ => {}
    }
}

/// Insert text at the edit cursor
pub(super) fn insert_text(app: &mut App, text: &str) {
    app.edit_buffer.insert_str(app.edit_cursor, text);
    app.edit_cursor += text.len();
}

/// Byte offset of the start of the line holding `cursor`
fn line_start(s: &str, cursor: usize) -> usize {
    s[..cursor].rfind('\n').map_or(0, |i| i + 1)
}

/// Byte offset of the end of the line holding `cursor`
fn line_end(s: &str, cursor: usize) -> usize {
    s[cursor..].find('\n').map_or(s.len(), |i| cursor + i)
}
