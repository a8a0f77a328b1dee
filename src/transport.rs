//! HTTP transport for session requests
//!
//! The `Transport` trait is the narrow seam between a session and the
//! network. Implementations never fail through the trait: a failed request
//! comes back as a `Response` without a body, which the validator reports as
//! an empty response.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header::CONTENT_TYPE, Client, Proxy};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// User-Agent sent with every request
pub const USER_AGENT: &str = concat!("wptools/", env!("CARGO_PKG_VERSION"), " (Rust)");

/// Transport metadata for one exchange
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestInfo {
    /// Content-Type of the response, or the failure message
    pub content: String,
    /// HTTP status code, 0 if no response was received
    pub status: u16,
    /// URL that was requested
    pub url: String,
    /// Size of the response body in bytes
    pub bytes: usize,
    /// Time taken by the exchange
    pub elapsed_ms: u64,
    /// When the response was received
    pub fetched_at: Option<DateTime<Utc>>,
}

impl RequestInfo {
    pub fn new(content: impl Into<String>, status: u16) -> Self {
        Self {
            content: content.into(),
            status,
            ..Self::default()
        }
    }
}

/// Per-call proxy and timeout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub proxy: Option<String>,
    pub timeout: Option<Duration>,
}

/// Body and metadata returned by a transport
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Raw body text, `None` when the request failed
    pub body: Option<String>,
    pub info: RequestInfo,
}

/// Performs GET requests for a session
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `query`, with `status` describing the request for logs
    async fn get(&self, query: &str, status: &str, options: &RequestOptions) -> Response;
}

/// Transport backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    verbose: bool,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    /// Creates a transport with the crate's User-Agent
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self::with_client(client)
    }

    /// Creates a transport with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            verbose: false,
        }
    }

    /// Logs request and response details at info level instead of debug
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Client to use for a call; proxies need a dedicated client
    fn client_for(&self, options: &RequestOptions) -> Result<Client, reqwest::Error> {
        match &options.proxy {
            Some(proxy) => Client::builder()
                .user_agent(USER_AGENT)
                .proxy(Proxy::all(proxy)?)
                .build(),
            None => Ok(self.client.clone()),
        }
    }

    async fn send(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<(String, RequestInfo), reqwest::Error> {
        let client = self.client_for(options)?;
        let mut request = client.get(url);
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status().as_u16();
        let content = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let text = response.text().await?;

        let info = RequestInfo {
            content,
            status,
            url: url.to_string(),
            bytes: text.len(),
            elapsed_ms: started.elapsed().as_millis() as u64,
            fetched_at: Some(Utc::now()),
        };
        Ok((text, info))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, query: &str, status: &str, options: &RequestOptions) -> Response {
        if self.verbose {
            info!(url = query, status, proxy = ?options.proxy, timeout = ?options.timeout, "GET");
        } else {
            debug!(url = query, status, "GET");
        }

        match self.send(query, options).await {
            Ok((text, info)) => {
                if self.verbose {
                    info!(status = info.status, bytes = info.bytes, elapsed_ms = info.elapsed_ms, "response");
                }
                Response {
                    body: Some(text),
                    info,
                }
            }
            Err(err) => {
                warn!(url = query, error = %err, "request failed");
                Response {
                    body: None,
                    info: RequestInfo {
                        content: err.to_string(),
                        status: err.status().map(|s| s.as_u16()).unwrap_or(0),
                        url: query.to_string(),
                        ..RequestInfo::default()
                    },
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) use canned::Canned;


#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_http_get_returns_body_and_info() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/w/api.php")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json; charset=utf-8")
            .with_body(r#"{"batchcomplete":true}"#)
            .create_async()
            .await;

        let url = format!("{}/w/api.php?action=query&format=json", server.url());
        let transport = HttpTransport::new();
        let response = transport
            .get(&url, "query, Test", &RequestOptions::default())
            .await;

        mock.assert_async().await;
        assert_eq!(response.body.as_deref(), Some(r#"{"batchcomplete":true}"#));
        assert_eq!(response.info.status, 200);
        assert_eq!(response.info.content, "application/json; charset=utf-8");
        assert_eq!(response.info.url, url);
        assert_eq!(response.info.bytes, 22);
        assert!(response.info.fetched_at.is_some());
    }

    #[tokio::test]
    async fn test_http_error_status_keeps_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/rest_v1/page/summary/Nope")
            .with_status(404)
            .with_header("content-type", "application/problem+json")
            .with_body(r#"{"type":"not_found"}"#)
            .create_async()
            .await;

        let url = format!("{}/api/rest_v1/page/summary/Nope", server.url());
        let response = HttpTransport::new()
            .get(&url, "restbase, Nope", &RequestOptions::default())
            .await;

        assert_eq!(response.info.status, 404);
        assert_eq!(response.body.as_deref(), Some(r#"{"type":"not_found"}"#));
    }

    #[tokio::test]
    async fn test_http_failure_becomes_empty_body() {
        // Nothing listens on port 9 (discard) in the test environment
        let response = HttpTransport::new()
            .get(
                "http://127.0.0.1:9/w/api.php",
                "query",
                &RequestOptions {
                    proxy: None,
                    timeout: Some(Duration::from_millis(500)),
                },
            )
            .await;

        assert!(response.body.is_none());
        assert_eq!(response.info.status, 0);
        assert!(!response.info.content.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_proxy_becomes_empty_body() {
        let response = HttpTransport::new()
            .get(
                "https://en.wikipedia.org/w/api.php",
                "query",
                &RequestOptions {
                    proxy: Some("not a proxy url".to_string()),
                    timeout: None,
                },
            )
            .await;

        assert!(response.body.is_none());
    }
}
