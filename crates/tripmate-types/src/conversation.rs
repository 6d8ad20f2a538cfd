use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::message::Message;

/// Lightweight, listable projection of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_timestamp_opt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub latest_message_preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl ConversationSummary {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            created_at: Some(now),
            updated_at: now,
            latest_message_preview: None,
            model: None,
            is_active: None,
        }
    }
}

/// Summary plus the full message history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(flatten)]
    pub summary: ConversationSummary,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new(summary: ConversationSummary, messages: Vec<Message>) -> Self {
        Self { summary, messages }
    }

    pub fn id(&self) -> &str {
        &self.summary.id
    }
}

/// One page of the conversation list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationPage {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub conversations: Vec<ConversationSummary>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// Backends emit either RFC 3339 or naive ISO timestamps (assumed UTC).
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_timestamp_opt(deserializer)?.unwrap_or_else(Utc::now))
}

fn lenient_timestamp_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_summary_accepts_naive_timestamps() {
        let json = r#"{
            "id": "c1",
            "title": "Kyoto",
            "created_at": "2024-05-01T08:30:00.123456",
            "updated_at": "2024-05-02T09:00:00Z",
            "latest_message_preview": null
        }"#;
        let summary: ConversationSummary = serde_json::from_str(json).unwrap();

        assert_eq!(summary.created_at.unwrap().hour(), 8);
        assert_eq!(summary.updated_at.day(), 2);
        assert!(summary.latest_message_preview.is_none());
    }

    #[test]
    fn test_conversation_flattens_summary() {
        let json = r#"{
            "id": "c1",
            "title": "Lisbon",
            "updated_at": "2024-05-02T09:00:00+02:00",
            "messages": [
                {"id": "u1", "role": "user", "content": "plan a trip"}
            ]
        }"#;
        let conv: Conversation = serde_json::from_str(json).unwrap();

        assert_eq!(conv.id(), "c1");
        assert_eq!(conv.summary.title, "Lisbon");
        assert_eq!(conv.messages.len(), 1);
        assert_eq!(conv.summary.updated_at.hour(), 7);
    }

    #[test]
    fn test_null_messages_become_empty() {
        let json = r#"{"id": "c1", "title": "t", "updated_at": "2024-05-02T09:00:00Z", "messages": null}"#;
        let conv: Conversation = serde_json::from_str(json).unwrap();
        assert!(conv.messages.is_empty());
    }
}
