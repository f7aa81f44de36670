use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use concierge_core::state::WidgetState;

use crate::app::App;
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
            app.poll_turn().await;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Ctrl-C quits from anywhere
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.window {
        WidgetState::Closed => handle_launcher_key(app, key),
        WidgetState::Open => handle_window_key(app, key),
    }
}

fn handle_launcher_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('o') | KeyCode::Enter => app.toggle(),
        _ => {}
    }
}

fn handle_window_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.toggle(),
        KeyCode::Up => app.scroll_chat_up(),
        KeyCode::Down => app.scroll_chat_down(),
        _ => handle_input_editing(app, key),
    }
}

fn handle_input_editing(app: &mut App, key: KeyEvent) {
    // Input is locked while a reply is pending
    if !app.input_enabled() {
        return;
    }

    match key.code {
        KeyCode::Enter => app.submit(),
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
            app.input.insert(byte_pos, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}

/// Convert a character index into a byte index for String operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .map(|(i, _)| i)
        .nth(char_idx)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use concierge_core::state::{ChatMessage, TurnState};
    use concierge_core::transport::CompletionTransport;
    use std::sync::Arc;

    struct NullTransport;

    #[async_trait]
    impl CompletionTransport for NullTransport {
        async fn complete(&self, _messages: &[ChatMessage]) -> anyhow::Result<String> {
            Ok(String::new())
        }
    }

    fn test_app() -> App {
        App::new("Assistant", "system prompt", Arc::new(NullTransport))
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn launcher_enter_opens_and_esc_closes() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.window, WidgetState::Open);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.window, WidgetState::Closed);
    }

    #[test]
    fn typing_edits_at_the_cursor() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter); // open

        for c in "helo".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.input, "hello");
        assert_eq!(app.input_cursor, 4);

        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Delete);
        assert_eq!(app.input, "ello");

        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.input, "ell");
    }

    #[test]
    fn multibyte_input_keeps_char_indexing() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);

        for c in "héllo".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.input, "hélo");
    }

    #[test]
    fn editing_is_locked_while_awaiting_a_reply() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);
        app.turn = TurnState::AwaitingReply;

        press(&mut app, KeyCode::Char('x'));
        assert!(app.input.is_empty());

        // Closing the window still works
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.window, WidgetState::Closed);
    }

    #[test]
    fn ctrl_c_quits_from_any_state() {
        let mut app = test_app();
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }
}
