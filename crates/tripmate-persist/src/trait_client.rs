use async_trait::async_trait;
use tripmate_types::{Conversation, ConversationPage, Message};

use crate::error::Result;

/// Request/response operations on stored conversations
///
/// Implementations talk to the backend; the chat store only sees this trait.
#[async_trait]
pub trait ConversationClient: Send + Sync {
    /// List conversation summaries (1-based page)
    async fn list_conversations(&self, page: u32, page_size: u32) -> Result<ConversationPage>;

    /// Create a new, empty conversation
    async fn create_conversation(&self, title: &str) -> Result<Conversation>;

    /// Fetch a conversation with its full message history
    async fn get_conversation(&self, conversation_id: &str) -> Result<Conversation>;

    /// Fetch only the messages of a conversation
    async fn get_conversation_messages(&self, conversation_id: &str) -> Result<Vec<Message>>;

    async fn delete_conversation(&self, conversation_id: &str) -> Result<()>;

    /// Remove every message but keep the conversation
    async fn clear_conversation_messages(&self, conversation_id: &str) -> Result<()>;

    /// Cheap reachability probe; never errors
    async fn health_check(&self) -> bool {
        match self.list_conversations(1, 1).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("Connection test failed: {}", e);
                false
            }
        }
    }
}
