use serde::{Deserialize, Serialize};

/// One entry of a conversation transcript
///
/// `id` is unique within a conversation; `content` grows while the
/// assistant reply is streamed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(default)]
    pub message_type: MessageType,
}

impl Message {
    pub fn new(
        id: impl Into<String>,
        role: MessageRole,
        content: impl Into<String>,
        message_type: MessageType,
    ) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
            message_type,
        }
    }

    /// User message with a freshly generated id
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(crate::new_id(), MessageRole::User, content, MessageType::Normal)
    }

    /// Empty assistant placeholder, filled by streamed chunks
    pub fn assistant_placeholder(id: impl Into<String>) -> Self {
        Self::new(id, MessageRole::Assistant, "", MessageType::Normal)
    }

    pub fn is_tool_related(&self) -> bool {
        matches!(
            self.message_type,
            MessageType::ToolCallStatus | MessageType::ToolResult
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
    Tool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    #[default]
    Normal,
    ToolCallStatus,
    ToolResult,
}

/// Lifecycle of a single tool invocation as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCallStatus {
    Calling,
    Success,
    Failed,
}

impl ToolCallStatus {
    pub fn from_success(success: bool) -> Self {
        if success {
            Self::Success
        } else {
            Self::Failed
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Calling)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolStatusEntry {
    pub status: ToolCallStatus,
    pub content: String,
}

impl ToolStatusEntry {
    pub fn new(status: ToolCallStatus, content: impl Into<String>) -> Self {
        Self {
            status,
            content: content.into(),
        }
    }
}
