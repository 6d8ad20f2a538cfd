use chrono::{DateTime, Utc};
use tripmate_types::{ConversationSummary, Message};

/// Maximum preview length, in characters
pub const PREVIEW_LIMIT: usize = 30;
pub const ELLIPSIS: &str = "...";

/// First 30 characters, with an ellipsis when something was cut
pub fn preview(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(PREVIEW_LIMIT).collect();
    if chars.next().is_some() {
        format!("{}{}", head, ELLIPSIS)
    } else {
        head
    }
}

/// Re-project a summary after local activity and move it to the front
///
/// Stamps `updated_at`, previews the last live message and, when the live
/// list holds exactly one message, uses that preview as the title. Other
/// summaries keep their relative order. Returns `false` if `conversation_id`
/// is not listed.
pub fn update_conversation_order(
    conversations: &mut Vec<ConversationSummary>,
    conversation_id: &str,
    messages: &[Message],
    now: DateTime<Utc>,
) -> bool {
    let Some(index) = conversations.iter().position(|c| c.id == conversation_id) else {
        tracing::debug!("Conversation {} not in list, skipping reorder", conversation_id);
        return false;
    };

    let mut summary = conversations.remove(index);
    summary.updated_at = now;

    if let Some(latest) = messages.last() {
        let text = preview(&latest.content);
        // Only reliable right after creation; a one-message window of an
        // older conversation also retitles it
        if messages.len() == 1 {
            summary.title = text.clone();
        }
        summary.latest_message_preview = Some(text);
    }

    conversations.insert(0, summary);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn summaries(ids: &[&str]) -> Vec<ConversationSummary> {
        ids.iter()
            .map(|id| ConversationSummary::new(*id, format!("title {}", id)))
            .collect()
    }

    fn ids(list: &[ConversationSummary]) -> Vec<&str> {
        list.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_preview_truncation() {
        assert_eq!(preview(""), "");
        assert_eq!(preview("short"), "short");

        let exact = "a".repeat(30);
        assert_eq!(preview(&exact), exact);

        let long = "b".repeat(31);
        assert_eq!(preview(&long), format!("{}...", "b".repeat(30)));
    }

    #[test]
    fn test_preview_counts_characters_not_bytes() {
        let text = "去京都旅行".repeat(7); // 35 chars
        let out = preview(&text);

        assert_eq!(out.chars().count(), 33);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_moves_target_to_front_preserving_rest() {
        let mut list = summaries(&["a", "b", "c", "d"]);
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let messages = vec![Message::user("x"), Message::user("y")];

        assert!(update_conversation_order(&mut list, "c", &messages, now));

        assert_eq!(ids(&list), vec!["c", "a", "b", "d"]);
        assert_eq!(list[0].updated_at, now);
        assert_eq!(list[0].latest_message_preview.as_deref(), Some("y"));
        assert_eq!(list[0].title, "title c");
    }

    #[test]
    fn test_single_message_becomes_title() {
        let mut list = summaries(&["a", "b"]);
        let long = "Plan a week in Kyoto with temples and food".to_string();
        let messages = vec![Message::user(long)];

        update_conversation_order(&mut list, "b", &messages, Utc::now());

        assert_eq!(list[0].title, "Plan a week in Kyoto with temp...");
        assert_eq!(list[0].latest_message_preview, Some(list[0].title.clone()));
    }

    #[test]
    fn test_empty_messages_only_stamp_and_reorder() {
        let mut list = summaries(&["a", "b"]);
        list[1].latest_message_preview = Some("kept".to_string());

        update_conversation_order(&mut list, "b", &[], Utc::now());

        assert_eq!(ids(&list), vec!["b", "a"]);
        assert_eq!(list[0].latest_message_preview.as_deref(), Some("kept"));
        assert_eq!(list[0].title, "title b");
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut list = summaries(&["a", "b"]);
        let before = list.clone();

        assert!(!update_conversation_order(&mut list, "zzz", &[Message::user("x")], Utc::now()));
        assert_eq!(list, before);
    }
}
