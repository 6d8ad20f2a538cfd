use futures::{Stream, StreamExt};
use serde_json::Value;
use tripmate_types::ChatEvent;

use super::buffering::LineBuffer;
use crate::error::StreamError;
use crate::transport::EventStream;
use crate::{DONE_SENTINEL, EVENT_PREFIX};

/// Classification of one trimmed line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame<'a> {
    Blank,
    Done,
    Data(&'a str),
    /// Not prefixed with the event marker; ignored
    Other(&'a str),
}

pub fn classify_line(line: &str) -> Frame<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Frame::Blank;
    }
    if line == DONE_SENTINEL {
        return Frame::Done;
    }
    match line.strip_prefix(EVENT_PREFIX) {
        Some(data) if data.trim() == DONE_SENTINEL => Frame::Done,
        Some(data) => Frame::Data(data),
        None => Frame::Other(line),
    }
}

/// What a data frame carried
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Event(ChatEvent),
    /// Server-signalled failure (`{"error": ...}`)
    Error(String),
}

/// Parse the JSON after the event marker
pub fn decode_payload(data: &str) -> Result<Payload, serde_json::Error> {
    let value: Value = serde_json::from_str(data)?;

    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Ok(Payload::Error(message));
    }

    serde_json::from_value(value).map(Payload::Event)
}

/// Turn a raw byte stream into a stream of chat events
///
/// Frame-level parse failures are logged and skipped. The sentinel ends the
/// stream immediately and discards whatever is still buffered. An error
/// frame or a read failure yields one `Err` and ends the stream.
pub fn parse_event_stream<S, B, E>(bytes: S) -> EventStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(bytes);
        let mut buffer = LineBuffer::with_capacity(4096);
        let mut emitted = 0usize;

        while let Some(chunk_result) = byte_chunks.next().await {
            let chunk = match chunk_result {
                Ok(chunk) => chunk,
                Err(e) => {
                    tracing::error!("Chat stream read failed after {} events: {}", emitted, e);
                    yield Err(StreamError::Body(e.to_string()));
                    return;
                }
            };

            buffer.extend(chunk.as_ref());

            while let Some(line) = buffer.next_line() {
                match classify_line(&line) {
                    Frame::Blank => continue,
                    Frame::Done => {
                        tracing::debug!(
                            "Chat stream sentinel received after {} events, discarding {} buffered bytes",
                            emitted,
                            buffer.len()
                        );
                        buffer.clear();
                        return;
                    }
                    Frame::Other(raw) => {
                        tracing::debug!("Ignoring unprefixed stream line: {}", raw);
                    }
                    Frame::Data(data) => match decode_payload(data) {
                        Ok(Payload::Event(event)) => {
                            emitted += 1;
                            yield Ok(event);
                        }
                        Ok(Payload::Error(message)) => {
                            tracing::error!("Chat stream error frame: {}", message);
                            yield Err(StreamError::Server(message));
                            return;
                        }
                        Err(e) => {
                            tracing::warn!("Error parsing chunk: {} (frame: {})", e, data);
                        }
                    },
                }
            }
        }

        if !buffer.is_empty() {
            tracing::debug!("Chat stream ended with {} unterminated bytes", buffer.len());
        }
        tracing::debug!("Chat stream completed with {} events", emitted);
    })
}
