use thiserror::Error;
use tripmate_types::TokenStoreError;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Unauthorized: please log in again")]
    Unauthorized,

    #[error("Conversation not found: {0}")]
    NotFound(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Token storage error: {0}")]
    TokenStore(#[from] TokenStoreError),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PersistError>;
