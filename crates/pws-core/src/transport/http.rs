//! HTTP transport over reqwest.

use std::time::Duration;

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use reqwest::{header, Client, Url};
use serde_json::Value;
use tracing::debug;

use super::Transport;
use crate::error::TransportError;

/// Transport that posts JSON to endpoints relative to a base URL.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    /// Create a transport for `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // A base without a trailing slash would lose its last path segment on join
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)
            .with_context(|| format!("Invalid server URL: {}", base_url))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(endpoint)
            .map_err(|e| TransportError::InvalidEndpoint(format!("{}: {}", endpoint, e)))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(TransportError::from_status(status, &body))
        }
    }

    async fn send(&self, endpoint: &str, body: Value) -> Result<Value, TransportError> {
        let url = self.endpoint_url(endpoint)?;
        debug!(url = %url, "POST");

        let response = self
            .client
            .post(url)
            .header(header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let text = response.text().await?;

        serde_json::from_str(&text).map_err(|e| {
            TransportError::InvalidResponse(format!("Failed to parse JSON from {}: {}", endpoint, e))
        })
    }
}

impl Transport for HttpTransport {
    fn post<'a>(&'a self, endpoint: &'a str, body: Value) -> BoxFuture<'a, Result<Value, TransportError>> {
        Box::pin(self.send(endpoint, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const TEST_TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let transport = HttpTransport::new("http://localhost:8891/practice", TEST_TIMEOUT)
            .expect("transport");
        assert_eq!(transport.base_url().as_str(), "http://localhost:8891/practice/");
        assert_eq!(
            transport.endpoint_url("login").expect("url").as_str(),
            "http://localhost:8891/practice/login"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(HttpTransport::new("not a url", TEST_TIMEOUT).is_err());
    }

    #[tokio::test]
    async fn test_post_sends_json_and_decodes_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/login")
            .match_body(Matcher::Json(json!({"username": "alice", "password": "secret"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": 1, "token": "abc"}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(&server.url(), TEST_TIMEOUT).expect("transport");
        let body = transport
            .post("login", json!({"username": "alice", "password": "secret"}))
            .await
            .expect("response");

        assert_eq!(body, json!({"success": 1, "token": "abc"}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/submissions")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let transport = HttpTransport::new(&server.url(), TEST_TIMEOUT).expect("transport");
        let err = transport
            .post("submissions", json!({}))
            .await
            .expect_err("503 should fail");

        assert!(matches!(err, TransportError::ServerError(ref body) if body == "maintenance"));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/login")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let transport = HttpTransport::new(&server.url(), TEST_TIMEOUT).expect("transport");
        let err = transport
            .post("login", json!({}))
            .await
            .expect_err("html should fail to decode");

        assert!(matches!(err, TransportError::InvalidResponse(_)));
    }
}
