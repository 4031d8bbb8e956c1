//! HTTP transport to the chat endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::wire::{ChatRequest, HealthStatus, ServerResponse};

const APPLICATION_JSON: &str = "application/json";

/// One request/response exchange with the chat backend.
///
/// The widget only depends on this trait, so tests and alternative hosts can
/// substitute their own transport.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Deliver `request` and decode the reply.
    ///
    /// Fails with [`Error::Server`] on a non-success status, regardless of
    /// the body, and with [`Error::Transport`] or [`Error::Decode`] when no
    /// usable response arrived.
    async fn exchange(&self, request: &ChatRequest) -> Result<ServerResponse>;
}

/// [`ChatTransport`] over HTTP.
///
/// # Example
///
/// ```rust,no_run
/// use parts_chat_widget::client::{ChatTransport, HttpTransport};
/// use parts_chat_widget::wire::ChatRequest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = HttpTransport::new("http://localhost:5000/api/chat")?;
/// let reply = transport
///     .exchange(&ChatRequest::new("Search Parts", "session_1_abcdefgh"))
///     .await?;
/// println!("{:?}", reply.reply);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: Url,
    health_url: Option<Url>,
    http: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport posting to `endpoint`.
    pub fn new(endpoint: impl AsRef<str>) -> Result<Self> {
        Self::with_client(endpoint, reqwest::Client::new())
    }

    /// Create a transport with a custom reqwest client.
    pub fn with_client(endpoint: impl AsRef<str>, http: reqwest::Client) -> Result<Self> {
        Ok(Self {
            endpoint: Url::parse(endpoint.as_ref())?,
            health_url: None,
            http,
        })
    }

    /// Build a client that gives up after `timeout`.
    pub fn with_timeout(endpoint: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(endpoint, http)
    }

    /// Set the URL probed by [`HttpTransport::health`].
    #[must_use]
    pub fn health_url(mut self, url: Url) -> Self {
        self.health_url = Some(url);
        self
    }

    /// Get the chat endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Query the backend health endpoint. Without an explicit URL, `health`
    /// is resolved next to the chat endpoint (`/bot/api/chat` probes
    /// `/bot/api/health`).
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = match &self.health_url {
            Some(url) => url.clone(),
            None => self.endpoint.join("health")?,
        };
        let response = self
            .http
            .get(url)
            .header(ACCEPT, APPLICATION_JSON)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Server {
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn exchange(&self, request: &ChatRequest) -> Result<ServerResponse> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .header(ACCEPT, APPLICATION_JSON)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        debug!(name: "chat.http.response", status = status.as_u16(), "Chat endpoint answered");
        if !status.is_success() {
            return Err(Error::Server {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
