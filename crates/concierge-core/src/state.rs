//! UI-agnostic widget state types
//!
//! This module contains data structures shared between the conversation
//! store, the transports, and whatever front-end embeds the widget. Nothing
//! in here depends on a UI framework.

use serde::{Deserialize, Serialize};

/// A single entry in the conversation sent to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// The sender of a chat message. Serialized lowercase to match the wire
/// format the completion endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// Whether the chat window is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    Closed,
    Open,
}

impl WidgetState {
    pub fn toggled(self) -> Self {
        match self {
            WidgetState::Closed => WidgetState::Open,
            WidgetState::Open => WidgetState::Closed,
        }
    }

    pub fn is_open(self) -> bool {
        self == WidgetState::Open
    }
}

/// Whether the widget accepts input or is waiting on a completion request.
/// A turn moves `Idle -> AwaitingReply -> Idle`; the return to `Idle` is
/// unconditional on settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingReply,
}

impl TurnState {
    pub fn is_idle(self) -> bool {
        self == TurnState::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_twice_returns_to_start() {
        assert_eq!(WidgetState::Closed.toggled().toggled(), WidgetState::Closed);
        assert_eq!(WidgetState::Open.toggled().toggled(), WidgetState::Open);
    }

    #[test]
    fn roles_serialize_lowercase() {
        let msg = ChatMessage::new(ChatRole::Assistant, "hello");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "assistant");
        assert_eq!(value["content"], "hello");
    }

    #[test]
    fn roles_deserialize_from_wire_names() {
        let msg: ChatMessage =
            serde_json::from_str(r#"{"role":"system","content":"be helpful"}"#).unwrap();
        assert_eq!(msg.role, ChatRole::System);
    }
}
