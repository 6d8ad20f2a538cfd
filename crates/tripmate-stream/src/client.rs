use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use tripmate_types::{ChatRequest, TokenStore};

use crate::buffer_utils::parse_event_stream;
use crate::error::{Result, StreamError};
use crate::transport::{ChatTransport, EventStream};
use crate::STREAM_PATH;

/// Chat transport over HTTP POST with a line-framed streaming body
pub struct HttpChatTransport {
    http_client: reqwest::Client,
    base_url: String,
    path: String,
    tokens: Arc<dyn TokenStore>,
}

impl HttpChatTransport {
    /// Create a transport against `base_url` (e.g. `http://localhost:8000/api`)
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        Self::with_connect_timeout(base_url, tokens, Duration::from_secs(10))
    }

    /// Only the handshake is bounded; the body may stream indefinitely
    pub fn with_connect_timeout(
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenStore>,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            path: STREAM_PATH.to_string(),
            tokens,
        })
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn open(&self, request: ChatRequest) -> Result<EventStream> {
        let endpoint = self.endpoint();
        let body = serde_json::to_vec(&request)?;

        tracing::debug!(
            "Opening chat stream at {} with {} messages",
            endpoint,
            request.messages.len()
        );

        let mut builder = self.http_client.post(&endpoint).body(body);
        if let Some(bearer) = self.tokens.bearer() {
            let value = HeaderValue::from_str(&bearer)
                .map_err(|_| StreamError::Config("Invalid bearer token format".to_string()))?;
            builder = builder.header(AUTHORIZATION, value);
        }

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Chat stream request failed: status={}, body={}", status, body);
            return Err(StreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        if response.content_length() == Some(0) {
            tracing::error!("Chat stream response has no body");
            return Err(StreamError::MissingBody);
        }

        Ok(parse_event_stream(response.bytes_stream()))
    }
}
