use chrono::Utc;
use tripmate_types::{
    new_id, ChatEvent, ChatRequest, Conversation, ConversationSummary, Message, MessageRole,
    MessageType,
};

use crate::observer::{StoreEvent, StoreObserver};
use crate::projection::{preview, update_conversation_order};
use crate::tool_status::{tool_name_from_call, tool_name_from_result, ToolStatusIndex};

/// Everything the UI renders for the chat view
///
/// Read through [`ChatStore::state`](crate::ChatStore::state); the mutating
/// methods here are the synchronous steps the store drives.
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    pub messages: Vec<Message>,
    pub is_loading: bool,
    pub is_streaming: bool,
    pub error: Option<String>,
    /// Cumulative text of the assistant reply being streamed
    pub stream_content: String,
    pub current_assistant_message_id: Option<String>,
    pub current_tool_call_message_id: Option<String>,
    pub tool_status: ToolStatusIndex,
    pub conversations: Vec<ConversationSummary>,
    pub current_conversation: Option<ConversationSummary>,
    pub is_conversation_loading: bool,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_conversation_id(&self) -> Option<&str> {
        self.current_conversation.as_ref().map(|c| c.id.as_str())
    }

    fn find_message_mut(&mut self, id: &str) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }

    fn push_message(&mut self, message: Message, observer: &dyn StoreObserver) {
        self.messages.push(message);
        if let Some(message) = self.messages.last() {
            observer.on_event(StoreEvent::MessageAppended(message));
        }
    }

    fn notify_tool_status(&self, message_id: &str, tool_name: &str, observer: &dyn StoreObserver) {
        if let Some(entry) = self.tool_status.get(message_id, tool_name) {
            observer.on_event(StoreEvent::ToolStatusChanged {
                message_id,
                tool_name,
                entry,
            });
        }
    }

    fn reset_stream(&mut self) {
        self.is_loading = false;
        self.is_streaming = false;
        self.stream_content.clear();
        self.current_assistant_message_id = None;
    }

    /// Re-project the current conversation's summary from the live transcript
    pub fn update_conversation_order(&mut self, conversation_id: &str, observer: &dyn StoreObserver) {
        if update_conversation_order(
            &mut self.conversations,
            conversation_id,
            &self.messages,
            Utc::now(),
        ) {
            self.sync_current(conversation_id);
            observer.on_event(StoreEvent::ConversationsChanged);
        }
    }

    /// Mirror the listed summary into `current_conversation`
    fn sync_current(&mut self, conversation_id: &str) {
        if self.current_conversation_id() != Some(conversation_id) {
            return;
        }
        if let Some(listed) = self.conversations.iter().find(|c| c.id == conversation_id) {
            self.current_conversation = Some(listed.clone());
        }
    }

    fn reorder_current(&mut self, observer: &dyn StoreObserver) {
        if let Some(id) = self.current_conversation_id().map(str::to_string) {
            self.update_conversation_order(&id, observer);
        }
    }

    /// Append the user's message and enter the streaming state
    ///
    /// Returns the request to send, or `None` for blank input.
    pub fn begin_send(&mut self, text: &str, observer: &dyn StoreObserver) -> Option<ChatRequest> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.push_message(Message::user(text), observer);
        self.reorder_current(observer);

        self.is_loading = true;
        self.error = None;
        self.is_streaming = true;
        self.stream_content.clear();
        observer.on_event(StoreEvent::StreamStarted);

        Some(ChatRequest::from_history(&self.messages))
    }

    /// Fold one event into the transcript
    pub fn apply_event(&mut self, event: ChatEvent, observer: &dyn StoreObserver) {
        tracing::debug!("Applying {} event", event.kind());

        match event {
            ChatEvent::MessageCreate { message_id, .. } => {
                self.stream_content.clear();
                if self.messages.iter().any(|m| m.id == message_id) {
                    tracing::warn!("Duplicate message_create for {}, reusing message", message_id);
                } else {
                    self.push_message(Message::assistant_placeholder(&message_id), observer);
                }
                self.current_assistant_message_id = Some(message_id);
            }

            ChatEvent::MessageChunk { message_id, content, .. } => {
                let Some(current_id) = self.current_assistant_message_id.clone() else {
                    tracing::warn!("Chunk for {} with no active assistant message, dropped", message_id);
                    return;
                };
                if message_id != current_id {
                    tracing::debug!("Chunk for {} applied to active message {}", message_id, current_id);
                }

                self.stream_content.push_str(&content);
                let cumulative = self.stream_content.clone();
                if let Some(message) = self.find_message_mut(&current_id) {
                    message.content = cumulative;
                    observer.on_event(StoreEvent::MessageUpdated(message));
                }
            }

            ChatEvent::ToolCall { content, .. } => {
                let tool_name = tool_name_from_call(&content);
                let message_id = new_id();
                self.current_tool_call_message_id = Some(message_id.clone());

                self.push_message(
                    Message::new(
                        message_id.clone(),
                        MessageRole::Assistant,
                        content.clone(),
                        MessageType::ToolCallStatus,
                    ),
                    observer,
                );

                self.tool_status.record_call(&message_id, &tool_name, &content);
                self.notify_tool_status(&message_id, &tool_name, observer);
            }

            ChatEvent::ToolResult { status, content } => {
                let tool_name = tool_name_from_result(&content);
                let message_id = new_id();

                self.push_message(
                    Message::new(
                        message_id.clone(),
                        MessageRole::Tool,
                        content.clone(),
                        MessageType::ToolResult,
                    ),
                    observer,
                );

                if !status.is_terminal() {
                    tracing::warn!("tool_result for {} reported a non-terminal status", tool_name);
                }

                let call_id = self.current_tool_call_message_id.clone();
                self.tool_status.record_result(
                    call_id.as_deref(),
                    &message_id,
                    &tool_name,
                    status,
                    &content,
                );
                if let Some(call_id) = call_id.as_deref() {
                    self.notify_tool_status(call_id, &tool_name, observer);
                }
                self.notify_tool_status(&message_id, &tool_name, observer);
            }
        }
    }

    /// Normal end of stream
    pub fn complete_stream(&mut self, observer: &dyn StoreObserver) {
        self.reset_stream();
        self.reorder_current(observer);
        observer.on_event(StoreEvent::StreamCompleted);
    }

    /// Fatal stream failure: keep what was folded, drop an empty placeholder
    pub fn fail_stream(&mut self, error: impl Into<String>, observer: &dyn StoreObserver) {
        let error = error.into();
        tracing::error!("Chat stream failed: {}", error);

        self.reset_stream();

        if self.messages.last().is_some_and(|m| m.content.is_empty()) {
            if let Some(removed) = self.messages.pop() {
                observer.on_event(StoreEvent::MessageRemoved { id: &removed.id });
            }
        }

        self.error = Some(error);
        if let Some(error) = self.error.as_deref() {
            observer.on_event(StoreEvent::StreamFailed { error });
        }
    }

    /// Make `conversation` current and replace the transcript with its history
    pub fn load_conversation(&mut self, conversation: Conversation, observer: &dyn StoreObserver) {
        if self.is_streaming {
            tracing::warn!(
                "Loading conversation {} while a stream is active, discarding stream state",
                conversation.id()
            );
            self.reset_stream();
        }
        self.current_tool_call_message_id = None;

        let Conversation { summary, messages } = conversation;
        self.current_conversation = Some(summary);
        self.set_messages(messages, observer);
    }

    /// Replace the transcript and rebuild the tool index from it
    pub fn set_messages(&mut self, messages: Vec<Message>, observer: &dyn StoreObserver) {
        self.messages = messages;
        self.tool_status.rebuild(&self.messages);
        observer.on_event(StoreEvent::MessagesReplaced {
            count: self.messages.len(),
        });
    }

    /// Empty the transcript and forget any error
    pub fn clear_messages(&mut self, observer: &dyn StoreObserver) {
        self.messages.clear();
        self.stream_content.clear();
        self.error = None;
        self.tool_status.clear();
        self.current_tool_call_message_id = None;
        observer.on_event(StoreEvent::MessagesReplaced { count: 0 });
    }

    pub fn set_conversations(&mut self, conversations: Vec<ConversationSummary>, observer: &dyn StoreObserver) {
        self.conversations = conversations;
        observer.on_event(StoreEvent::ConversationsChanged);
    }

    /// A freshly created conversation becomes current, listed first
    pub fn insert_created(
        &mut self,
        conversation: Conversation,
        title: &str,
        observer: &dyn StoreObserver,
    ) -> ConversationSummary {
        let mut summary = conversation.summary;
        summary.latest_message_preview = Some(preview(title));

        self.conversations.insert(0, summary.clone());
        self.current_conversation = Some(summary.clone());
        self.current_tool_call_message_id = None;
        self.messages.clear();
        self.tool_status.clear();

        observer.on_event(StoreEvent::ConversationsChanged);
        observer.on_event(StoreEvent::MessagesReplaced { count: 0 });
        summary
    }

    pub fn remove_conversation(&mut self, conversation_id: &str, observer: &dyn StoreObserver) {
        self.conversations.retain(|c| c.id != conversation_id);
        observer.on_event(StoreEvent::ConversationsChanged);

        if self.current_conversation_id() == Some(conversation_id) {
            self.current_conversation = None;
            self.current_tool_call_message_id = None;
            self.messages.clear();
            self.tool_status.clear();
            observer.on_event(StoreEvent::MessagesReplaced { count: 0 });
        }
    }

    /// Local bookkeeping after the server cleared a conversation's messages
    pub fn apply_cleared(&mut self, conversation_id: &str, observer: &dyn StoreObserver) {
        if self.current_conversation_id() == Some(conversation_id) {
            self.clear_messages(observer);
        }

        if let Some(summary) = self.conversations.iter_mut().find(|c| c.id == conversation_id) {
            summary.updated_at = Utc::now();
            summary.latest_message_preview = Some(String::new());
            self.sync_current(conversation_id);
            observer.on_event(StoreEvent::ConversationsChanged);
        }
    }
}
