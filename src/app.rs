use ratatui::layout::Rect;
use tracing::{error, info};

use crate::client::ChatClient;
use crate::error::ChatError;
use crate::state::{Conversation, Message, CONNECTION_ERROR};
use crate::ui;

/// Chat state: the draft being typed, the conversation log, and whether a
/// reply is outstanding.
#[derive(Debug, Clone, Default)]
pub struct ChatWidget {
    pub draft: String,
    pub cursor: usize, // cursor position in draft, in chars
    pub conversation: Conversation,
    pub pending: bool,
}

impl ChatWidget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send is only possible while idle
    pub fn can_send(&self) -> bool {
        !self.pending
    }

    /// First half of a submission: record the user's message and go pending.
    ///
    /// Returns the text to send, or `None` when the draft is blank or a reply
    /// is still outstanding. In both cases nothing changes.
    pub fn begin_submit(&mut self) -> Option<String> {
        if self.pending || self.draft.trim().is_empty() {
            return None;
        }

        let content = std::mem::take(&mut self.draft);
        self.cursor = 0;
        self.conversation.push(Message::user(content.clone()));
        self.pending = true;
        Some(content)
    }

    /// Second half of a submission: record the bot's reply (or the fixed
    /// error text) and go idle.
    pub fn finish_submit(&mut self, result: Result<String, ChatError>) {
        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, "chat request failed");
                CONNECTION_ERROR.to_string()
            }
        };
        self.conversation.push(Message::bot(reply));
        self.pending = false;
    }

    /// Run a whole submission inline, waiting for the reply
    pub async fn submit_draft(&mut self, client: &ChatClient) {
        if let Some(content) = self.begin_submit() {
            let result = client.send(&content).await;
            self.finish_submit(result);
        }
    }

    // Draft editing, cursor-aware and UTF-8 safe

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.draft, self.cursor);
        self.draft.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn delete_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.draft, self.cursor);
            self.draft.remove(byte_pos);
        }
    }

    pub fn delete_at_cursor(&mut self) {
        if self.cursor < self.draft.chars().count() {
            let byte_pos = char_to_byte_index(&self.draft, self.cursor);
            self.draft.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.draft.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.draft.chars().count();
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    SendButton,
}

pub struct App {
    pub should_quit: bool,
    pub focus: Focus,
    pub chat: ChatWidget,
    pub client: ChatClient,

    // Messages window scrolling
    pub scroll: u16,
    pub follow_tail: bool,
    pub messages_height: u16, // inner height, set on render
    pub messages_width: u16,  // inner width, set on render

    // Areas for mouse hit-testing, set on render
    pub send_area: Option<Rect>,
    pub input_area: Option<Rect>,
}

impl App {
    pub fn new(client: ChatClient) -> Self {
        info!(endpoint = %client.endpoint(), "starting chat session");
        Self {
            should_quit: false,
            focus: Focus::Input,
            chat: ChatWidget::new(),
            client,
            scroll: 0,
            follow_tail: true,
            messages_height: 0,
            messages_width: 0,
            send_area: None,
            input_area: None,
        }
    }

    /// Start a submission whose request runs outside the event loop.
    ///
    /// Returns the client and text to send; the caller delivers the result
    /// back through `receive_reply`. `None` when nothing is to be sent.
    pub fn start_submit(&mut self) -> Option<(ChatClient, String)> {
        let content = self.chat.begin_submit()?;
        self.follow_tail = true;
        Some((self.client.clone(), content))
    }

    pub fn receive_reply(&mut self, result: Result<String, ChatError>) {
        self.chat.finish_submit(result);
        self.follow_tail = true;
    }

    /// Total rendered lines of the messages window at the current width
    pub fn total_message_lines(&self) -> u16 {
        // Use actual window width for wrap calculation, default to 50 if not set
        let wrap_width = if self.messages_width > 0 {
            self.messages_width
        } else {
            50
        };

        // Counted with the renderer's own word wrapping
        let lines = ui::messages_paragraph(&self.chat.conversation, self.chat.pending)
            .line_count(wrap_width);
        u16::try_from(lines).unwrap_or(u16::MAX)
    }

    fn max_scroll(&self) -> u16 {
        let visible_height = if self.messages_height > 0 {
            self.messages_height
        } else {
            20
        };
        self.total_message_lines().saturating_sub(visible_height)
    }

    /// Keep the newest message (and the indicator) in view
    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.max_scroll();
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
        self.follow_tail = false;
    }

    /// Scroll towards the tail; reaching it resumes following new messages
    pub fn scroll_down(&mut self, lines: u16) {
        let max_scroll = self.max_scroll();
        self.scroll = self.scroll.saturating_add(lines).min(max_scroll);
        self.follow_tail = self.scroll == max_scroll;
    }

    pub fn scroll_page_up(&mut self) {
        self.scroll_up(self.messages_height.max(1));
    }

    pub fn scroll_page_down(&mut self) {
        self.scroll_down(self.messages_height.max(1));
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Input => Focus::SendButton,
            Focus::SendButton => Focus::Input,
        };
    }
}
