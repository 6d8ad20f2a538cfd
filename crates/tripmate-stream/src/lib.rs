pub mod buffer_utils;
pub mod client;
pub mod error;
pub mod transport;

pub use buffer_utils::{classify_line, decode_payload, parse_event_stream, Frame, LineBuffer, Payload};
pub use client::HttpChatTransport;
pub use error::StreamError;
pub use transport::{ChatTransport, EventStream};

/// Marker that prefixes every event-bearing line
pub const EVENT_PREFIX: &str = "data: ";

/// Line that ends the stream early; anything buffered after it is discarded
pub const DONE_SENTINEL: &str = "[DONE]";

/// Default path of the streaming chat endpoint, relative to the API base URL
pub const STREAM_PATH: &str = "/chat/completions/stream";
