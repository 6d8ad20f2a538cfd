use std::collections::HashMap;

use serde::Deserialize;
use tripmate_types::{Message, MessageType, ToolCallStatus, ToolStatusEntry};

pub const TOOL_CALL_PREFIX: &str = "正在调用工具: ";
pub const TOOL_RESULT_PREFIX: &str = "工具 ";
pub const TOOL_SUCCESS_SUFFIX: &str = " 调用完成";
pub const TOOL_FAILED_SUFFIX: &str = " 调用失败";

/// Tool name from a `tool_call` status line ("正在调用工具: search")
pub fn tool_name_from_call(content: &str) -> String {
    let content = content.trim();
    content
        .strip_prefix(TOOL_CALL_PREFIX.trim_end())
        .unwrap_or(content)
        .trim()
        .to_string()
}

/// Tool name from a `tool_result` status line ("工具 search 调用完成")
pub fn tool_name_from_result(content: &str) -> String {
    let content = content.trim();
    let name = content.strip_prefix(TOOL_RESULT_PREFIX).unwrap_or(content);
    let name = name
        .strip_suffix(TOOL_SUCCESS_SUFFIX)
        .or_else(|| name.strip_suffix(TOOL_FAILED_SUFFIX))
        .unwrap_or(name);
    name.trim().to_string()
}

pub fn calling_line(tool_name: &str) -> String {
    format!("{}{}", TOOL_CALL_PREFIX, tool_name)
}

pub fn result_line(tool_name: &str, status: ToolCallStatus) -> String {
    let suffix = match status {
        ToolCallStatus::Failed => TOOL_FAILED_SUFFIX,
        _ => TOOL_SUCCESS_SUFFIX,
    };
    format!("{}{}{}", TOOL_RESULT_PREFIX, tool_name, suffix)
}

// Persisted `tool_call_status` content: {"tool_calls": [{"function": {"name": ...}}]}
#[derive(Deserialize)]
struct StoredToolCalls {
    #[serde(default)]
    tool_calls: Option<Vec<StoredToolCall>>,
}

#[derive(Deserialize)]
struct StoredToolCall {
    #[serde(default)]
    function: Option<StoredFunction>,
}

#[derive(Deserialize)]
struct StoredFunction {
    #[serde(default)]
    name: Option<String>,
}

// Persisted `tool_result` content: {"tool_name": ..., "success": ...}
#[derive(Deserialize)]
struct StoredToolResult {
    #[serde(default)]
    tool_name: Option<String>,
    #[serde(default)]
    success: bool,
}

/// Per-message tool status, keyed by `(message_id, tool_name)`
///
/// Derived from the transcript: [`rebuild`](Self::rebuild) recomputes it from
/// stored history, while [`record_call`](Self::record_call) and
/// [`record_result`](Self::record_result) apply live stream events. During a
/// stream the index may lead the transcript (a call can be `calling` before
/// its result message exists).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolStatusIndex {
    entries: HashMap<String, HashMap<String, ToolStatusEntry>>,
}

impl ToolStatusIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: &[Message]) -> Self {
        let mut index = Self::new();
        index.rebuild(messages);
        index
    }

    /// Recompute from a complete message history
    ///
    /// Replayed tool calls are recorded as `success`: the stored call message
    /// does not carry its terminal outcome.
    pub fn rebuild(&mut self, messages: &[Message]) {
        self.entries.clear();

        for message in messages {
            match message.message_type {
                MessageType::ToolCallStatus => self.replay_tool_calls(message),
                MessageType::ToolResult => self.replay_tool_result(message),
                MessageType::Normal => {}
            }
        }

        tracing::debug!(
            "Rebuilt tool status index: {} entries across {} messages",
            self.len(),
            self.entries.len()
        );
    }

    fn replay_tool_calls(&mut self, message: &Message) {
        let stored: StoredToolCalls = match serde_json::from_str(&message.content) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Failed to parse tool call message {}: {}", message.id, e);
                return;
            }
        };

        let names = stored
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter_map(|call| call.function.and_then(|f| f.name))
            .filter(|name| !name.is_empty());

        for name in names {
            let entry = ToolStatusEntry::new(ToolCallStatus::Success, calling_line(&name));
            self.insert(&message.id, &name, entry);
        }
    }

    fn replay_tool_result(&mut self, message: &Message) {
        let stored: StoredToolResult = match serde_json::from_str(&message.content) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Failed to parse tool result message {}: {}", message.id, e);
                return;
            }
        };

        if let Some(name) = stored.tool_name.filter(|n| !n.is_empty()) {
            let status = ToolCallStatus::from_success(stored.success);
            let entry = ToolStatusEntry::new(status, result_line(&name, status));
            self.insert(&message.id, &name, entry);
        }
    }

    /// Live `tool_call`: the new status message starts out `calling`
    pub fn record_call(&mut self, message_id: &str, tool_name: &str, content: &str) {
        self.insert(
            message_id,
            tool_name,
            ToolStatusEntry::new(ToolCallStatus::Calling, content),
        );
    }

    /// Live `tool_result`: resolve the pending call and mirror the status
    /// under the result message so either id can be looked up
    pub fn record_result(
        &mut self,
        call_message_id: Option<&str>,
        result_message_id: &str,
        tool_name: &str,
        status: ToolCallStatus,
        content: &str,
    ) {
        if let Some(call_id) = call_message_id {
            self.insert(call_id, tool_name, ToolStatusEntry::new(status, content));
        }
        self.insert(
            result_message_id,
            tool_name,
            ToolStatusEntry::new(status, content),
        );
    }

    fn insert(&mut self, message_id: &str, tool_name: &str, entry: ToolStatusEntry) {
        self.entries
            .entry(message_id.to_string())
            .or_default()
            .insert(tool_name.to_string(), entry);
    }

    /// Tool entries attached to a message
    pub fn for_message(&self, message_id: &str) -> Option<&HashMap<String, ToolStatusEntry>> {
        self.entries.get(message_id)
    }

    pub fn get(&self, message_id: &str, tool_name: &str) -> Option<&ToolStatusEntry> {
        self.entries.get(message_id)?.get(tool_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &ToolStatusEntry)> {
        self.entries.iter().flat_map(|(message_id, tools)| {
            tools
                .iter()
                .map(move |(tool, entry)| (message_id.as_str(), tool.as_str(), entry))
        })
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Total number of `(message, tool)` entries
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
