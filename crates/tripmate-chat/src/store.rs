use std::sync::Arc;

use futures::StreamExt;
use tripmate_persist::{ConversationClient, PersistError};
use tripmate_stream::ChatTransport;
use tripmate_types::{Conversation, ConversationSummary, Message, ToolStatusEntry};

use crate::observer::{NoopObserver, StoreObserver};
use crate::state::ChatState;

pub type Result<T> = std::result::Result<T, PersistError>;

#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Model name sent with every chat request; server default when `None`
    pub model: Option<String>,
    /// Page size used by [`ChatStore::refresh_conversations`]
    pub page_size: u32,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            model: None,
            page_size: 20,
        }
    }
}

/// Single-writer owner of the chat state
///
/// Every mutation goes through `&mut self`, so a stream being folded by
/// [`send_message`](Self::send_message) cannot interleave with a
/// conversation load or another send.
pub struct ChatStore {
    transport: Arc<dyn ChatTransport>,
    conversations: Arc<dyn ConversationClient>,
    observer: Arc<dyn StoreObserver>,
    options: StoreOptions,
    state: ChatState,
}

impl ChatStore {
    pub fn new(transport: Arc<dyn ChatTransport>, conversations: Arc<dyn ConversationClient>) -> Self {
        Self {
            transport,
            conversations,
            observer: Arc::new(NoopObserver),
            options: StoreOptions::default(),
            state: ChatState::new(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn StoreObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn messages(&self) -> &[Message] {
        &self.state.messages
    }

    pub fn conversations(&self) -> &[ConversationSummary] {
        &self.state.conversations
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    /// Tool entries for one message, empty when it has none
    pub fn tool_status(&self, message_id: &str) -> Vec<(&str, &ToolStatusEntry)> {
        self.state
            .tool_status
            .for_message(message_id)
            .map(|tools| tools.iter().map(|(name, entry)| (name.as_str(), entry)).collect())
            .unwrap_or_default()
    }

    /// Send `text` and fold the streamed reply into the transcript
    ///
    /// Never fails: transport and server errors end up in `state().error`.
    pub async fn send_message(&mut self, text: &str) {
        let observer = Arc::clone(&self.observer);

        let Some(mut request) = self.state.begin_send(text, observer.as_ref()) else {
            return;
        };
        if let Some(model) = &self.options.model {
            request.model = Some(model.clone());
        }

        let mut events = match self.transport.open(request).await {
            Ok(events) => events,
            Err(e) => {
                self.state.fail_stream(e.to_string(), observer.as_ref());
                return;
            }
        };

        while let Some(item) = events.next().await {
            match item {
                Ok(event) => self.state.apply_event(event, observer.as_ref()),
                Err(e) => {
                    self.state.fail_stream(e.to_string(), observer.as_ref());
                    return;
                }
            }
        }

        self.state.complete_stream(observer.as_ref());
    }

    /// Replace the transcript with a fully loaded conversation
    pub fn load_conversation(&mut self, conversation: Conversation) {
        tracing::info!(
            "Loading conversation {} ({} messages)",
            conversation.id(),
            conversation.messages.len()
        );
        self.state.load_conversation(conversation, self.observer.as_ref());
    }

    pub fn set_messages(&mut self, messages: Vec<Message>) {
        self.state.set_messages(messages, self.observer.as_ref());
    }

    pub fn clear_messages(&mut self) {
        self.state.clear_messages(self.observer.as_ref());
    }

    /// Reload the first page of summaries; empty on failure
    pub async fn refresh_conversations(&mut self) -> Vec<ConversationSummary> {
        self.state.is_conversation_loading = true;
        let result = self
            .conversations
            .list_conversations(1, self.options.page_size)
            .await;
        self.state.is_conversation_loading = false;

        match result {
            Ok(page) => {
                self.state.set_conversations(page.conversations, self.observer.as_ref());
                self.state.conversations.clone()
            }
            Err(e) => {
                self.record_error(e);
                Vec::new()
            }
        }
    }

    pub async fn create_conversation(&mut self, title: &str) -> Result<ConversationSummary> {
        let conversation = self
            .conversations
            .create_conversation(title)
            .await
            .map_err(|e| self.record_error(e))?;

        Ok(self
            .state
            .insert_created(conversation, title, self.observer.as_ref()))
    }

    /// Fetch a conversation with its history and make it current
    pub async fn open_conversation(&mut self, conversation_id: &str) -> Result<()> {
        let conversation = self
            .conversations
            .get_conversation(conversation_id)
            .await
            .map_err(|e| self.record_error(e))?;

        self.load_conversation(conversation);
        Ok(())
    }

    /// Fetch the stored messages without touching local state
    pub async fn fetch_conversation_messages(&mut self, conversation_id: &str) -> Result<Vec<Message>> {
        self.conversations
            .get_conversation_messages(conversation_id)
            .await
            .map_err(|e| self.record_error(e))
    }

    pub async fn delete_conversation(&mut self, conversation_id: &str) -> Result<()> {
        self.conversations
            .delete_conversation(conversation_id)
            .await
            .map_err(|e| self.record_error(e))?;

        self.state
            .remove_conversation(conversation_id, self.observer.as_ref());
        Ok(())
    }

    pub async fn clear_conversation_messages(&mut self, conversation_id: &str) -> Result<()> {
        self.conversations
            .clear_conversation_messages(conversation_id)
            .await
            .map_err(|e| self.record_error(e))?;

        self.state
            .apply_cleared(conversation_id, self.observer.as_ref());
        Ok(())
    }

    /// Surface a management failure in `state().error` and hand it back
    fn record_error(&mut self, err: PersistError) -> PersistError {
        tracing::error!("Conversation request failed: {}", err);
        self.state.error = Some(err.to_string());
        err
    }
}
