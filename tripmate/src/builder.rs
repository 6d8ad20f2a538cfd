//! High-level builder wiring a [`ChatStore`] to the HTTP backend

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tripmate_chat::{ChatStore, StoreObserver, StoreOptions};
use tripmate_persist::{ApiClient, AuthClient, HttpConversationClient, UnauthorizedHandler, DEFAULT_BASE_URL};
use tripmate_stream::HttpChatTransport;
use tripmate_types::{FileTokenStore, MemoryTokenStore, TokenStore};

/// Builder for a ready-to-use chat client
///
/// # Example
///
/// ```rust,no_run
/// use tripmate::prelude::*;
///
/// # fn main() -> Result<()> {
/// let client = ClientBuilder::new()
///     .base_url("http://localhost:8000/api")
///     .token_file("/home/me/.tripmate/token")
///     .model("trip-planner")
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: String,

    // Auth
    token: Option<String>,
    token_file: Option<PathBuf>,
    token_store: Option<Arc<dyn TokenStore>>,
    on_unauthorized: Option<UnauthorizedHandler>,

    // HTTP
    request_timeout: Duration,
    connect_timeout: Duration,

    // Store
    options: StoreOptions,
    observer: Option<Arc<dyn StoreObserver>>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            token_file: None,
            token_store: None,
            on_unauthorized: None,
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(10),
            options: StoreOptions::default(),
            observer: None,
        }
    }

    /// API root, e.g. `http://localhost:8000/api` (default)
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Seed the token store with a bearer token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Persist the token in a file instead of memory
    pub fn token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = Some(path.into());
        self
    }

    /// Use a custom token store; takes precedence over [`token_file`](Self::token_file)
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    /// Called after a 401 has cleared the stored token
    pub fn on_unauthorized(mut self, handler: UnauthorizedHandler) -> Self {
        self.on_unauthorized = Some(handler);
        self
    }

    /// Timeout for request/response calls (default: 10s)
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Connect timeout for the streaming call (default: 10s)
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.options.model = Some(model.into());
        self
    }

    /// Conversations fetched per list refresh (default: 20)
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.options.page_size = page_size;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn StoreObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is empty, the token cannot be
    /// written to the store, or an HTTP client cannot be constructed.
    pub fn build(self) -> Result<Client> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            anyhow::bail!("Base URL is required. Call .base_url(url)");
        }

        let tokens: Arc<dyn TokenStore> = match (self.token_store, self.token_file) {
            (Some(store), _) => store,
            (None, Some(path)) => Arc::new(FileTokenStore::new(path)),
            (None, None) => Arc::new(MemoryTokenStore::new()),
        };
        if let Some(token) = self.token {
            tokens
                .set_token(&token)
                .context("Failed to store bearer token")?;
        }

        let mut api = ApiClient::with_timeout(base_url, Arc::clone(&tokens), self.request_timeout)
            .context("Failed to create API client")?;
        if let Some(handler) = self.on_unauthorized {
            api = api.on_unauthorized(handler);
        }

        let transport = HttpChatTransport::with_connect_timeout(base_url, tokens, self.connect_timeout)
            .context("Failed to create streaming transport")?;

        let mut store = ChatStore::new(
            Arc::new(transport),
            Arc::new(HttpConversationClient::new(api.clone())),
        )
        .with_options(self.options);
        if let Some(observer) = self.observer {
            store = store.with_observer(observer);
        }

        tracing::info!("Chat client configured for {}", base_url);

        Ok(Client {
            store,
            auth: AuthClient::new(api),
        })
    }
}

/// A configured chat store plus the auth endpoints sharing its token
pub struct Client {
    pub store: ChatStore,
    pub auth: AuthClient,
}
