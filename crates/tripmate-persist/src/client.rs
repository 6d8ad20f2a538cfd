use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use tripmate_types::{Conversation, ConversationPage, Message};

use crate::api::ApiClient;
use crate::error::{PersistError, Result};
use crate::trait_client::ConversationClient;

const CONVERSATIONS_PATH: &str = "/chat/conversations";

/// REST implementation of [`ConversationClient`]
#[derive(Clone)]
pub struct HttpConversationClient {
    api: ApiClient,
}

impl HttpConversationClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn conversation_path(conversation_id: &str) -> String {
        format!("{}/{}", CONVERSATIONS_PATH, conversation_id)
    }
}

fn not_found_as(conversation_id: &str, err: PersistError) -> PersistError {
    match err {
        PersistError::Status { status: 404, .. } => {
            PersistError::NotFound(conversation_id.to_string())
        }
        other => other,
    }
}

#[async_trait]
impl ConversationClient for HttpConversationClient {
    async fn list_conversations(&self, page: u32, page_size: u32) -> Result<ConversationPage> {
        let builder = self
            .api
            .request(Method::GET, CONVERSATIONS_PATH)?
            .query(&[("page", page), ("page_size", page_size)]);

        let page: ConversationPage = self.api.send_json(builder).await?;
        tracing::debug!("Fetched {} conversation summaries", page.conversations.len());
        Ok(page)
    }

    async fn create_conversation(&self, title: &str) -> Result<Conversation> {
        let builder = self
            .api
            .request(Method::POST, CONVERSATIONS_PATH)?
            .json(&json!({ "title": title }));

        let conversation: Conversation = self.api.send_json(builder).await?;
        tracing::info!("Created conversation {}", conversation.id());
        Ok(conversation)
    }

    async fn get_conversation(&self, conversation_id: &str) -> Result<Conversation> {
        let builder = self
            .api
            .request(Method::GET, &Self::conversation_path(conversation_id))?;

        self.api
            .send_json(builder)
            .await
            .map_err(|e| not_found_as(conversation_id, e))
    }

    async fn get_conversation_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let path = format!("{}/messages", Self::conversation_path(conversation_id));
        let builder = self.api.request(Method::GET, &path)?;

        self.api
            .send_json(builder)
            .await
            .map_err(|e| not_found_as(conversation_id, e))
    }

    async fn delete_conversation(&self, conversation_id: &str) -> Result<()> {
        let builder = self
            .api
            .request(Method::DELETE, &Self::conversation_path(conversation_id))?;

        self.api
            .send_empty(builder)
            .await
            .map_err(|e| not_found_as(conversation_id, e))?;
        tracing::info!("Deleted conversation {}", conversation_id);
        Ok(())
    }

    async fn clear_conversation_messages(&self, conversation_id: &str) -> Result<()> {
        let path = format!("{}/messages", Self::conversation_path(conversation_id));
        let builder = self.api.request(Method::DELETE, &path)?;

        self.api
            .send_empty(builder)
            .await
            .map_err(|e| not_found_as(conversation_id, e))?;
        tracing::info!("Cleared messages of conversation {}", conversation_id);
        Ok(())
    }
}
