use serde::{Deserialize, Serialize};

use crate::message::{Message, MessageRole};

/// Body of the streaming chat request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub stream: bool,
}

impl ChatRequest {
    /// Build a request from the local transcript
    ///
    /// Tool-result messages stay in the local display but are not resent.
    pub fn from_history(history: &[Message]) -> Self {
        let messages = history
            .iter()
            .filter(|m| m.role != MessageRole::Tool)
            .cloned()
            .collect();

        Self {
            messages,
            model: None,
            stream: true,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}
