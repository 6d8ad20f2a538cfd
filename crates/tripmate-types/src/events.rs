use serde::{Deserialize, Serialize};

use crate::message::ToolCallStatus;

/// One typed event decoded from the chat stream
///
/// Frames arrive as `data: {"type": "...", ...}` lines; the `type` tag selects
/// the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Assistant reply started; subsequent chunks carry this id
    MessageCreate {
        message_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        created_at: Option<serde_json::Value>,
    },

    /// Text fragment of the current assistant reply
    MessageChunk {
        message_id: String,
        #[serde(default)]
        index: u64,
        content: String,
    },

    /// Server started invoking a tool
    ToolCall {
        #[serde(default = "calling")]
        status: ToolCallStatus,
        content: String,
    },

    /// Tool invocation finished
    ToolResult {
        status: ToolCallStatus,
        content: String,
    },
}

fn calling() -> ToolCallStatus {
    ToolCallStatus::Calling
}

impl ChatEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ChatEvent::MessageCreate { .. } => "message_create",
            ChatEvent::MessageChunk { .. } => "message_chunk",
            ChatEvent::ToolCall { .. } => "tool_call",
            ChatEvent::ToolResult { .. } => "tool_result",
        }
    }
}
