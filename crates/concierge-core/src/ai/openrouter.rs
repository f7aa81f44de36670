use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::state::ChatMessage;
use crate::transport::{parse_reply, CompletionRequest, CompletionTransport};

/// Self-managed-credential transport: talks to the completion API directly
/// with a bearer token the widget fetched at initialization. Sends the model
/// identifier plus the two informational headers the API expects.
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    referrer: String,
    title: String,
}

impl OpenRouterClient {
    pub fn new(endpoint: &str, api_key: &str, model: &str, referrer: &str, title: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            referrer: referrer.to_string(),
            title: title.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionTransport for OpenRouterClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = CompletionRequest {
            model: Some(&self.model),
            messages,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", &self.referrer)
            .header("X-Title", &self.title)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("completion request failed with {}: {}", status, text));
        }

        let body = response.text().await?;
        parse_reply(&body)
    }
}
