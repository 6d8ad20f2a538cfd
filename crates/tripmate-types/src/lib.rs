pub mod auth;
pub mod conversation;
pub mod events;
pub mod message;
pub mod request;

pub use auth::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreError};
pub use conversation::{Conversation, ConversationPage, ConversationSummary};
pub use events::ChatEvent;
pub use message::{Message, MessageRole, MessageType, ToolCallStatus, ToolStatusEntry};
pub use request::ChatRequest;

/// Generate a fresh client-side identifier (UUID v4, hyphenated)
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
