use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::state::ChatMessage;

/// Which completion strategy carries a turn to the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// POST through a trusted intermediary that injects the credential and
    /// picks the model server-side.
    Proxy,
    /// POST straight to the completion API with a client-held bearer token.
    OpenRouter,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Proxy => "proxy",
            Transport::OpenRouter => "openrouter",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "proxy" => Some(Transport::Proxy),
            "openrouter" => Some(Transport::OpenRouter),
            _ => None,
        }
    }

    pub fn all() -> Vec<Transport> {
        vec![Transport::Proxy, Transport::OpenRouter]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Transport::Proxy => "Proxy (server-held key)",
            Transport::OpenRouter => "OpenRouter (client key)",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Transport::Proxy => "https://concierge-widget.netlify.app/.netlify/functions/chat",
            Transport::OpenRouter => "https://openrouter.ai/api/v1/chat/completions",
        }
    }
}

/// A completion strategy: given the full ordered conversation, produce one
/// assistant reply. Implementations issue exactly one request per call; the
/// caller serializes turns, so no concurrent calls happen per instance.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Request body shared by both transports. The proxy variant leaves `model`
/// unset and the field is omitted from the JSON entirely.
#[derive(Serialize)]
pub(crate) struct CompletionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) model: Option<&'a str>,
    pub(crate) messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: String,
}

/// Extracts `choices[0].message.content` from a completion body. Any other
/// shape is an error: a failed turn must leave no trace in history, so a
/// body we cannot read is treated the same as an HTTP failure.
pub fn parse_reply(body: &str) -> Result<String> {
    let response: CompletionResponse =
        serde_json::from_str(body).map_err(|e| anyhow!("malformed completion response: {}", e))?;

    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| anyhow!("completion response contained no choices"))
}
