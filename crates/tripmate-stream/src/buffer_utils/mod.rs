mod buffering;
mod sse_parser;

pub use buffering::LineBuffer;
pub use sse_parser::{classify_line, decode_payload, parse_event_stream, Frame, Payload};
