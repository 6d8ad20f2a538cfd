use std::io::Write;
use std::sync::Mutex;

use tripmate::chat::{StoreEvent, StoreObserver};
use tripmate::types::{MessageRole, MessageType};

/// Writes streamed replies to stdout as they grow
///
/// Chunk updates carry the cumulative text, so only the unseen suffix is
/// printed.
#[derive(Default)]
pub struct StreamPrinter {
    printed: Mutex<Option<(String, usize)>>,
}

impl StreamPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }

    fn reset(&self) {
        if let Ok(mut printed) = self.printed.lock() {
            *printed = None;
        }
    }
}

impl StoreObserver for StreamPrinter {
    fn on_event(&self, event: StoreEvent<'_>) {
        match event {
            StoreEvent::MessageAppended(message) => match message.message_type {
                MessageType::ToolCallStatus | MessageType::ToolResult => {
                    self.reset();
                    self.write(&format!("\n  [{}]\n", message.content));
                }
                MessageType::Normal if message.role == MessageRole::Assistant => {
                    if let Ok(mut printed) = self.printed.lock() {
                        *printed = Some((message.id.clone(), 0));
                    }
                    self.write("\nassistant> ");
                }
                MessageType::Normal => {}
            },
            StoreEvent::MessageUpdated(message) => {
                let Ok(mut printed) = self.printed.lock() else {
                    return;
                };
                let seen = match printed.as_ref() {
                    Some((id, seen)) if *id == message.id => *seen,
                    _ => 0,
                };
                let delta = message.content.get(seen..).unwrap_or_default();
                *printed = Some((message.id.clone(), message.content.len()));
                drop(printed);
                self.write(delta);
            }
            StoreEvent::StreamCompleted => {
                self.reset();
                self.write("\n");
            }
            StoreEvent::StreamFailed { error } => {
                self.reset();
                self.write(&format!("\nerror: {}\n", error));
            }
            _ => {}
        }
    }
}
