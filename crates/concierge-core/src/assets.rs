use anyhow::{anyhow, Result};
use reqwest::Client;

/// Fetches a small text asset and trims surrounding whitespace.
///
/// Used at widget initialization for the system prompt and, on the
/// client-credential transport, the bearer token. A non-success status is an
/// error; initialization treats any error here as fatal to the instance.
pub async fn fetch_text_asset(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "asset fetch failed with status {} for {}",
            response.status(),
            url
        ));
    }

    Ok(response.text().await?.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn trims_the_fetched_body() {
        let url = serve_once("200 OK", "  You are a helpful assistant.  \n").await;
        let client = Client::new();
        let text = fetch_text_asset(&client, &url).await.unwrap();
        assert_eq!(text, "You are a helpful assistant.");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let url = serve_once("404 Not Found", "missing").await;
        let client = Client::new();
        assert!(fetch_text_asset(&client, &url).await.is_err());
    }
}
