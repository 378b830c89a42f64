use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

use crate::app::{App, Focus};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent, tx: &UnboundedSender<AppEvent>) {
    match event {
        AppEvent::Key(key) => handle_key(app, key, tx),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse, tx),
        AppEvent::Resize(_, _) => {}
        AppEvent::Reply(result) => app.receive_reply(result),
    }
}

fn handle_key(app: &mut App, key: KeyEvent, tx: &UnboundedSender<AppEvent>) {
    // Global keys that work regardless of focus
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Tab | KeyCode::BackTab => app.toggle_focus(),
        KeyCode::PageUp => app.scroll_page_up(),
        KeyCode::PageDown => app.scroll_page_down(),
        _ => match app.focus {
            Focus::Input => handle_input_key(app, key, tx),
            Focus::SendButton => handle_button_key(app, key, tx),
        },
    }
}

fn handle_input_key(app: &mut App, key: KeyEvent, tx: &UnboundedSender<AppEvent>) {
    match key.code {
        KeyCode::Enter => submit(app, tx),
        KeyCode::Backspace => app.chat.delete_before_cursor(),
        KeyCode::Delete => app.chat.delete_at_cursor(),
        KeyCode::Left => app.chat.cursor_left(),
        KeyCode::Right => app.chat.cursor_right(),
        KeyCode::Home => app.chat.cursor_home(),
        KeyCode::End => app.chat.cursor_end(),
        KeyCode::Char(c) if is_plain_char(key) => app.chat.insert_char(c),
        _ => {}
    }
}

fn handle_button_key(app: &mut App, key: KeyEvent, tx: &UnboundedSender<AppEvent>) {
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => press_send_button(app, tx),
        // Typing goes back to the input
        KeyCode::Char(c) if is_plain_char(key) => {
            app.focus = Focus::Input;
            app.chat.insert_char(c);
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent, tx: &UnboundedSender<AppEvent>) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let (x, y) = (mouse.column, mouse.row);
            if app.send_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false) {
                app.focus = Focus::SendButton;
                press_send_button(app, tx);
            } else if app.input_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false) {
                app.focus = Focus::Input;
            }
        }
        MouseEventKind::ScrollUp => app.scroll_up(1),
        MouseEventKind::ScrollDown => app.scroll_down(1),
        _ => {}
    }
}

/// Control and Alt chords are shortcuts, not text
fn is_plain_char(key: KeyEvent) -> bool {
    !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

/// The button is inert while a reply is outstanding
fn press_send_button(app: &mut App, tx: &UnboundedSender<AppEvent>) {
    if app.chat.can_send() {
        submit(app, tx);
    }
}

/// Start a submission and deliver its result back to the event loop
fn submit(app: &mut App, tx: &UnboundedSender<AppEvent>) {
    if let Some((client, content)) = app.start_submit() {
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = client.send(&content).await;
            // Receiver is gone only when the app is quitting
            let _ = tx.send(AppEvent::Reply(result));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{closed_endpoint, spawn_replying_server};
    use crate::client::ChatClient;
    use crate::state::{Message, CONNECTION_ERROR};
    use crossterm::event::KeyEventState;
    use tokio::sync::mpsc;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: crossterm::event::KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn type_text(app: &mut App, text: &str, tx: &UnboundedSender<AppEvent>) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c)), tx);
        }
    }

    #[tokio::test]
    async fn test_enter_round_trip_through_event_loop() {
        let endpoint = spawn_replying_server("Your order is in transit.").await;
        let mut app = App::new(ChatClient::new(&endpoint));
        let (tx, mut rx) = mpsc::unbounded_channel();

        type_text(&mut app, "Where is my order #123?", &tx);
        handle_event(&mut app, key(KeyCode::Enter), &tx);

        assert!(app.chat.pending);
        assert_eq!(app.chat.draft, "");
        assert_eq!(app.chat.conversation.len(), 2);

        let reply = rx.recv().await.unwrap();
        handle_event(&mut app, reply, &tx);

        assert!(!app.chat.pending);
        assert_eq!(
            app.chat.conversation.tail(2),
            &[
                Message::user("Where is my order #123?"),
                Message::bot("Your order is in transit."),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_request_reaches_conversation() {
        let mut app = App::new(ChatClient::new(&closed_endpoint().await));
        let (tx, mut rx) = mpsc::unbounded_channel();

        type_text(&mut app, "test", &tx);
        handle_event(&mut app, key(KeyCode::Enter), &tx);
        let reply = rx.recv().await.unwrap();
        handle_event(&mut app, reply, &tx);

        assert_eq!(
            app.chat.conversation.tail(2),
            &[Message::user("test"), Message::bot(CONNECTION_ERROR)]
        );
    }

    #[tokio::test]
    async fn test_enter_spam_sends_once() {
        let endpoint = spawn_replying_server("ok").await;
        let mut app = App::new(ChatClient::new(&endpoint));
        let (tx, mut rx) = mpsc::unbounded_channel();

        type_text(&mut app, "one", &tx);
        handle_event(&mut app, key(KeyCode::Enter), &tx);
        type_text(&mut app, "two", &tx);
        handle_event(&mut app, key(KeyCode::Enter), &tx);
        handle_event(&mut app, key(KeyCode::Enter), &tx);

        // Only the first message went out; the second stays in the draft
        assert_eq!(app.chat.conversation.len(), 2);
        assert_eq!(app.chat.draft, "two");

        let reply = rx.recv().await.unwrap();
        handle_event(&mut app, reply, &tx);
        assert!(rx.try_recv().is_err());
        assert_eq!(app.chat.conversation.len(), 3);
    }

    #[tokio::test]
    async fn test_send_button_via_keyboard_and_mouse() {
        let endpoint = spawn_replying_server("ok").await;
        let mut app = App::new(ChatClient::new(&endpoint));
        let (tx, mut rx) = mpsc::unbounded_channel();

        type_text(&mut app, "hi", &tx);
        handle_event(&mut app, key(KeyCode::Tab), &tx);
        assert_eq!(app.focus, Focus::SendButton);
        handle_event(&mut app, key(KeyCode::Enter), &tx);
        assert!(app.chat.pending);

        let reply = rx.recv().await.unwrap();
        handle_event(&mut app, reply, &tx);

        app.send_area = Some(Rect::new(50, 10, 10, 3));
        handle_event(&mut app, key(KeyCode::Char('y')), &tx);
        assert_eq!(app.focus, Focus::Input);

        let click = AppEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 52,
            row: 11,
            modifiers: KeyModifiers::NONE,
        });
        handle_event(&mut app, click, &tx);
        assert!(app.chat.pending);
        assert_eq!(app.chat.conversation.last(), Some(&Message::user("y")));
    }

    #[test]
    fn test_escape_quits() {
        let mut app = App::new(ChatClient::new("http://127.0.0.1:9/chat"));
        let (tx, _rx) = mpsc::unbounded_channel();
        handle_event(&mut app, key(KeyCode::Esc), &tx);
        assert!(app.should_quit);
    }

    #[test]
    fn test_blank_enter_does_nothing() {
        let mut app = App::new(ChatClient::new("http://127.0.0.1:9/chat"));
        let (tx, mut rx) = mpsc::unbounded_channel();
        type_text(&mut app, "  ", &tx);
        handle_event(&mut app, key(KeyCode::Enter), &tx);

        assert!(!app.chat.pending);
        assert_eq!(app.chat.conversation.len(), 1);
        assert!(rx.try_recv().is_err());
    }

    fn key_with(code: KeyCode, modifiers: KeyModifiers) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers,
            kind: crossterm::event::KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn test_modifier_chords_do_not_type() {
        let mut app = App::new(ChatClient::new("http://127.0.0.1:9/chat"));
        let (tx, _rx) = mpsc::unbounded_channel();

        handle_event(&mut app, key_with(KeyCode::Char('a'), KeyModifiers::CONTROL), &tx);
        handle_event(&mut app, key_with(KeyCode::Char('x'), KeyModifiers::ALT), &tx);
        assert_eq!(app.chat.draft, "");

        handle_event(&mut app, key_with(KeyCode::Char('A'), KeyModifiers::SHIFT), &tx);
        assert_eq!(app.chat.draft, "A");

        app.focus = Focus::SendButton;
        handle_event(&mut app, key_with(KeyCode::Char('b'), KeyModifiers::CONTROL), &tx);
        assert_eq!(app.focus, Focus::SendButton);
        assert_eq!(app.chat.draft, "A");
    }

    #[test]
    fn test_mouse_wheel_is_capped_and_refollows_tail() {
        let mut app = App::new(ChatClient::new("http://127.0.0.1:9/chat"));
        let (tx, _rx) = mpsc::unbounded_channel();
        for i in 0..10 {
            app.chat.conversation.push(Message::user(format!("message {i}")));
        }
        app.messages_width = 40;
        app.messages_height = 5;
        app.scroll_to_bottom();
        let bottom = app.scroll;

        let wheel = |kind| {
            AppEvent::Mouse(MouseEvent {
                kind,
                column: 0,
                row: 0,
                modifiers: KeyModifiers::NONE,
            })
        };

        handle_event(&mut app, wheel(MouseEventKind::ScrollUp), &tx);
        assert!(!app.follow_tail);
        for _ in 0..5 {
            handle_event(&mut app, wheel(MouseEventKind::ScrollDown), &tx);
        }
        assert_eq!(app.scroll, bottom);
        assert!(app.follow_tail);
    }
}
