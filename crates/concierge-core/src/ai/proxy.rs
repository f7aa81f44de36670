use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::state::ChatMessage;
use crate::transport::{parse_reply, CompletionRequest, CompletionTransport};

/// Server-proxy transport: posts the bare conversation to a trusted
/// intermediary. No credential, no model field, no extra headers; the
/// intermediary injects all of that before forwarding upstream.
#[derive(Clone)]
pub struct ProxyClient {
    client: Client,
    endpoint: String,
}

impl ProxyClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }
}

#[async_trait]
impl CompletionTransport for ProxyClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = CompletionRequest {
            model: None,
            messages,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "completion request failed with status: {}",
                response.status()
            ));
        }

        let body = response.text().await?;
        parse_reply(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ChatRole;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// One-shot HTTP endpoint that answers every request with a canned
    /// status and body.
    async fn endpoint_with(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn returns_the_assistant_reply() {
        let url = endpoint_with("200 OK", r#"{"choices":[{"message":{"content":"Hi there"}}]}"#)
            .await;
        let client = ProxyClient::new(&url);
        let messages = vec![ChatMessage::new(ChatRole::User, "Hello")];
        assert_eq!(client.complete(&messages).await.unwrap(), "Hi there");
    }

    #[tokio::test]
    async fn server_errors_fail_the_turn() {
        let url = endpoint_with("500 Internal Server Error", "boom").await;
        let client = ProxyClient::new(&url);
        let messages = vec![ChatMessage::new(ChatRole::User, "Hello")];
        assert!(client.complete(&messages).await.is_err());
    }

    #[tokio::test]
    async fn malformed_bodies_fail_the_turn() {
        let url = endpoint_with("200 OK", r#"{"choices":[]}"#).await;
        let client = ProxyClient::new(&url);
        let messages = vec![ChatMessage::new(ChatRole::User, "Hello")];
        assert!(client.complete(&messages).await.is_err());
    }
}
