use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use tripmate_types::{ChatEvent, ChatRequest};

use crate::error::StreamError;

/// Lazy sequence of decoded events for one request
///
/// Ends normally on completion (end of body or sentinel). A failure is
/// delivered as a single `Err` item, after which the stream yields nothing.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<ChatEvent, StreamError>> + Send>>;

/// Opens one long-lived chat request and exposes its events
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send the request; fails fast on non-OK status or a missing body
    async fn open(&self, request: ChatRequest) -> Result<EventStream, StreamError>;
}
