use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tripmate_types::TokenStore;

use crate::error::{PersistError, Result};

/// Invoked after a 401 cleared the stored token (e.g. navigate to login)
pub type UnauthorizedHandler = Arc<dyn Fn() + Send + Sync>;

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Shared HTTP plumbing for request/response calls
///
/// Attaches the bearer token, unwraps the `{"data": ...}` envelope and turns
/// a 401 into a token clear plus the unauthorized callback.
#[derive(Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    on_unauthorized: Option<UnauthorizedHandler>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        Self::with_timeout(base_url, tokens, Duration::from_secs(10))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenStore>,
        timeout: Duration,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
            on_unauthorized: None,
        })
    }

    pub fn on_unauthorized(mut self, handler: UnauthorizedHandler) -> Self {
        self.on_unauthorized = Some(handler);
        self
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http_client.request(method, url);

        if let Some(bearer) = self.tokens.bearer() {
            let value = HeaderValue::from_str(&bearer)
                .map_err(|_| PersistError::Config("Invalid bearer token format".to_string()))?;
            builder = builder.header(AUTHORIZATION, value);
        }

        Ok(builder)
    }

    /// Send and decode the enveloped payload
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| PersistError::Decode(e.to_string()))?;
        Ok(envelope.data)
    }

    /// Send and ignore the body
    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> Result<()> {
        self.send(builder).await.map(|_| ())
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(|e| {
            tracing::error!("Network Error: {}", e);
            PersistError::Http(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!("API Error: status={}, body={}", status, body);

        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
            return Err(PersistError::Unauthorized);
        }

        Err(PersistError::Status {
            status: status.as_u16(),
            message: error_message(&body).unwrap_or_else(|| status.to_string()),
        })
    }

    fn handle_unauthorized(&self) {
        if let Err(e) = self.tokens.clear_token() {
            tracing::warn!("Failed to clear token after 401: {}", e);
        }
        if let Some(handler) = &self.on_unauthorized {
            handler();
        }
    }
}

// FastAPI-style `detail`, or `message` / `error`, else the raw body
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let value: Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(_) => return Some(trimmed.to_string()),
    };

    ["detail", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key))
        .map(|field| match field {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .or_else(|| Some(trimmed.to_string()))
}
