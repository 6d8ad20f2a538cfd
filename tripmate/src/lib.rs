//! # Tripmate - streaming chat client for a travel assistant
//!
//! Tripmate talks to a travel-planning chat backend and keeps a live,
//! render-ready view of the conversation:
//! - **Streaming replies** folded token-by-token from an SSE response
//! - **Tool activity** tracked per message (`calling` / `success` / `failed`)
//! - **Conversation list** kept in most-recent-first order with previews
//! - **Bearer auth** with a pluggable token store
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tripmate::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ClientBuilder::new()
//!         .base_url("http://localhost:8000/api")
//!         .token("eyJ...")
//!         .build()?;
//!
//!     let mut store = client.store;
//!     store.send_message("Plan three days in Lisbon").await;
//!
//!     for message in store.messages() {
//!         println!("{:?}: {}", message.role, message.content);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **tripmate-types**: wire and domain types (ChatEvent, Message, Conversation, token stores)
//! - **tripmate-stream**: SSE line decoding and the streaming chat transport
//! - **tripmate-persist**: conversation management and auth over the REST API
//! - **tripmate-chat**: the store that folds events into state

pub use tripmate_chat as chat;
pub use tripmate_persist as persist;
pub use tripmate_stream as stream;
pub use tripmate_types as types;

pub use tripmate_chat::{ChatState, ChatStore, StoreEvent, StoreObserver, StoreOptions};
pub use tripmate_persist::{AuthClient, ConversationClient, PersistError};
pub use tripmate_stream::{ChatTransport, StreamError};
pub use tripmate_types::{ChatEvent, Conversation, ConversationSummary, Message, MessageRole};

/// Wiring of transport, persistence and store from one configuration
pub mod builder;

pub mod prelude {
    pub use crate::builder::{Client, ClientBuilder};
    pub use crate::chat::{ChatStore, StoreEvent, StoreObserver, StoreOptions};
    pub use crate::types::{ChatEvent, Message, MessageRole, MessageType, ToolCallStatus};
    pub use anyhow::Result;
}
