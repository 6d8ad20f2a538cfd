use thiserror::Error;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Failed to send request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error! status: {status}")]
    Status { status: u16, body: String },

    #[error("No response body available")]
    MissingBody,

    #[error("Stream read error: {0}")]
    Body(String),

    #[error("{0}")]
    Server(String),

    #[error("Failed to serialize request: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid transport configuration: {0}")]
    Config(String),
}

impl StreamError {
    /// True when the failure happened before any frame could be read
    pub fn is_open_failure(&self) -> bool {
        matches!(
            self,
            StreamError::Request(_)
                | StreamError::Status { .. }
                | StreamError::MissingBody
                | StreamError::Serialization(_)
                | StreamError::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, StreamError>;
