use tripmate_types::{Message, ToolStatusEntry};

/// State change notification, emitted after the change is applied
#[derive(Debug, Clone, Copy)]
pub enum StoreEvent<'a> {
    MessageAppended(&'a Message),
    /// Content of an existing message changed (streamed chunk)
    MessageUpdated(&'a Message),
    MessageRemoved {
        id: &'a str,
    },
    /// The whole transcript was replaced (load, clear, set)
    MessagesReplaced {
        count: usize,
    },
    ToolStatusChanged {
        message_id: &'a str,
        tool_name: &'a str,
        entry: &'a ToolStatusEntry,
    },
    ConversationsChanged,
    StreamStarted,
    StreamCompleted,
    StreamFailed {
        error: &'a str,
    },
}

/// UI-side hook for observing the store
///
/// Called synchronously from inside the fold; implementations must not block.
pub trait StoreObserver: Send + Sync {
    fn on_event(&self, event: StoreEvent<'_>);
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl StoreObserver for NoopObserver {
    fn on_event(&self, _event: StoreEvent<'_>) {}
}

/// Observer that logs every change at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl StoreObserver for TracingObserver {
    fn on_event(&self, event: StoreEvent<'_>) {
        match event {
            StoreEvent::MessageAppended(m) => {
                tracing::debug!("Message appended: id={} role={:?} type={:?}", m.id, m.role, m.message_type)
            }
            StoreEvent::MessageUpdated(m) => {
                tracing::trace!("Message updated: id={} len={}", m.id, m.content.len())
            }
            StoreEvent::MessageRemoved { id } => tracing::debug!("Message removed: id={}", id),
            StoreEvent::MessagesReplaced { count } => {
                tracing::debug!("Transcript replaced with {} messages", count)
            }
            StoreEvent::ToolStatusChanged { message_id, tool_name, entry } => tracing::debug!(
                "Tool status: message={} tool={} status={:?}",
                message_id,
                tool_name,
                entry.status
            ),
            StoreEvent::ConversationsChanged => tracing::debug!("Conversation list changed"),
            StoreEvent::StreamStarted => tracing::debug!("Stream started"),
            StoreEvent::StreamCompleted => tracing::debug!("Stream completed"),
            StoreEvent::StreamFailed { error } => tracing::debug!("Stream failed: {}", error),
        }
    }
}
