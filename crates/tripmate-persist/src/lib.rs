pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod trait_client;

pub use api::{ApiClient, UnauthorizedHandler};
pub use auth::AuthClient;
pub use client::HttpConversationClient;
pub use error::PersistError;
pub use trait_client::ConversationClient;

/// Default API base URL of the trip-planning backend
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
