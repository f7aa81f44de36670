use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::error;

use concierge_core::conversation::Conversation;
use concierge_core::state::{ChatMessage, ChatRole, TurnState, WidgetState};
use concierge_core::transport::CompletionTransport;

/// Fixed reply shown when a turn fails. The conversation itself is left
/// exactly as it was after the user message.
pub const APOLOGY: &str = "Sorry, I encountered an error. Please try again later.";

/// Greeting rendered when the widget comes up. Display-only: it is never
/// part of the conversation sent to the completion endpoint.
pub const GREETING: &str = "Hi! How can I help you today?";

/// One widget instance. Owns the conversation, the rendered transcript, the
/// input line, and the in-flight turn, so multiple instances could coexist
/// and tests can drive one without a terminal.
pub struct App {
    pub should_quit: bool,

    // Widget session state
    pub window: WidgetState,
    pub turn: TurnState,

    // Input line state
    pub input: String,
    pub input_cursor: usize, // cursor position in chars

    // Rendered transcript; also carries the greeting and apology rows that
    // never enter the conversation
    pub transcript: Vec<ChatMessage>,
    pub conversation: Conversation,

    // In-flight turn, settled from the tick handler
    turn_task: Option<JoinHandle<anyhow::Result<String>>>,

    // Chat scroll state
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the chat area, set during render
    pub chat_width: u16,  // inner width, for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub title: String,

    transport: Arc<dyn CompletionTransport>,
}

impl App {
    pub fn new(
        title: impl Into<String>,
        system_prompt: impl Into<String>,
        transport: Arc<dyn CompletionTransport>,
    ) -> Self {
        Self {
            should_quit: false,
            window: WidgetState::Closed,
            turn: TurnState::Idle,
            input: String::new(),
            input_cursor: 0,
            transcript: vec![ChatMessage::new(ChatRole::Assistant, GREETING)],
            conversation: Conversation::new(system_prompt),
            turn_task: None,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            title: title.into(),
            transport,
        }
    }

    /// Flips the window between open and closed. The input line has focus
    /// whenever the window is open and no turn is pending.
    pub fn toggle(&mut self) {
        self.window = self.window.toggled();
    }

    pub fn input_enabled(&self) -> bool {
        self.turn.is_idle()
    }

    pub fn turn_in_flight(&self) -> bool {
        self.turn_task.is_some()
    }

    /// Sends the current input as one user turn. Whitespace-only input and
    /// submissions while a turn is pending are no-ops.
    pub fn submit(&mut self) {
        if !self.input_enabled() || self.turn_task.is_some() {
            return;
        }

        let text = self.input.trim().to_string();
        if text.is_empty() {
            return;
        }

        self.transcript
            .push(ChatMessage::new(ChatRole::User, text.clone()));
        self.conversation.push_user(text);
        self.input.clear();
        self.input_cursor = 0;
        self.turn = TurnState::AwaitingReply;
        self.scroll_chat_to_bottom();

        // One request per turn, carrying the full conversation so far
        let transport = Arc::clone(&self.transport);
        let messages = self.conversation.messages().to_vec();
        self.turn_task = Some(tokio::spawn(async move {
            transport.complete(&messages).await
        }));
    }

    /// Settles a finished turn. On success the reply joins the conversation
    /// and the transcript; on any failure the transcript gains the apology
    /// row and the conversation is left untouched. Input unlocks either way,
    /// whether or not the window is currently open.
    pub async fn poll_turn(&mut self) {
        let Some(task) = self.turn_task.take() else {
            return;
        };
        if !task.is_finished() {
            self.turn_task = Some(task);
            return;
        }

        let outcome = match task.await {
            Ok(result) => result,
            Err(join_error) => Err(anyhow::anyhow!(join_error)),
        };

        match outcome {
            Ok(reply) => {
                self.transcript
                    .push(ChatMessage::new(ChatRole::Assistant, reply.clone()));
                self.conversation.push_assistant(reply);
            }
            Err(err) => {
                error!("completion turn failed: {:#}", err);
                self.transcript
                    .push(ChatMessage::new(ChatRole::Assistant, APOLOGY));
            }
        }

        self.turn = TurnState::Idle;
        self.scroll_chat_to_bottom();
    }

    /// Aborts an in-flight turn; called on quit so the task does not outlive
    /// the widget.
    pub fn abort_turn(&mut self) {
        if let Some(task) = self.turn_task.take() {
            task.abort();
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.turn == TurnState::AwaitingReply {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_chat_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_chat_down(&mut self) {
        let visible = self.chat_height.max(1);
        let max_scroll = self.transcript_line_count().saturating_sub(visible);
        if self.chat_scroll < max_scroll {
            self.chat_scroll += 1;
        }
    }

    /// Scroll so the newest entry (or the thinking row) is visible.
    pub fn scroll_chat_to_bottom(&mut self) {
        let total_lines = self.transcript_line_count();
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        }
    }

    /// Wrapped line count of the rendered transcript, including the thinking
    /// row while a reply is pending. Mirrors how the chat pane lays lines
    /// out: role label, wrapped content, one blank line per message.
    fn transcript_line_count(&self) -> u16 {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for msg in &self.transcript {
            total_lines += 1; // role label line
            for line in msg.content.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // blank line after message
        }

        if self.turn == TurnState::AwaitingReply {
            total_lines += 2; // label + thinking row
        }

        total_lines
    }
}
