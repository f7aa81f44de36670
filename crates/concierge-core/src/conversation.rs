use crate::state::{ChatMessage, ChatRole};

/// Append-only conversation history for one widget instance.
///
/// The first message is always the system prompt, set once at construction.
/// User and assistant turns are appended after it and never mutated or
/// removed. Failed turns append nothing, so history holds only what was
/// actually exchanged.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::new(ChatRole::System, system_prompt)],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(ChatRole::User, content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(ChatRole::Assistant, content));
    }

    /// The full ordered history, system prompt first. This is exactly what
    /// goes on the wire for a completion request.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn system_prompt(&self) -> &str {
        &self.messages[0].content
    }
}
