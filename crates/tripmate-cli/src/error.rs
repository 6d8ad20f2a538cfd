use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Unknown command: {0} (try /help)")]
    UnknownCommand(String),

    #[error("No conversation selected, use /new or /open first")]
    NoConversation,
}
