use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tripmate_chat::{ChatStore, StoreEvent, StoreObserver, StoreOptions};
use tripmate_persist::{ConversationClient, PersistError};
use tripmate_stream::{ChatTransport, EventStream, StreamError};
use tripmate_types::{
    ChatEvent, ChatRequest, Conversation, ConversationPage, ConversationSummary, Message,
    MessageRole, MessageType, ToolCallStatus,
};

type Script = Result<Vec<Result<ChatEvent, StreamError>>, StreamError>;

/// Transport that replays one scripted response per `open`
#[derive(Default)]
struct ScriptedTransport {
    scripts: Mutex<Vec<Script>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedTransport {
    fn new(scripts: Vec<Script>) -> Arc<Self> {
        let mut scripts = scripts;
        scripts.reverse();
        Arc::new(Self {
            scripts: Mutex::new(scripts),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn open(&self, request: ChatRequest) -> Result<EventStream, StreamError> {
        self.requests.lock().unwrap().push(request);
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Ok(Vec::new()));

        let items = script?;
        Ok(Box::pin(async_stream::stream! {
            for item in items {
                tokio::task::yield_now().await;
                yield item;
            }
        }))
    }
}

/// In-memory conversation backend
#[derive(Default)]
struct MemoryConversations {
    conversations: Mutex<HashMap<String, Conversation>>,
    fail_with: Mutex<Option<u16>>,
}

impl MemoryConversations {
    fn with(conversations: Vec<Conversation>) -> Arc<Self> {
        let map = conversations
            .into_iter()
            .map(|c| (c.id().to_string(), c))
            .collect();
        Arc::new(Self {
            conversations: Mutex::new(map),
            fail_with: Mutex::new(None),
        })
    }

    fn fail_next(&self, status: u16) {
        *self.fail_with.lock().unwrap() = Some(status);
    }

    fn check(&self) -> Result<(), PersistError> {
        match self.fail_with.lock().unwrap().take() {
            Some(status) => Err(PersistError::Status {
                status,
                message: "backend unavailable".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ConversationClient for MemoryConversations {
    async fn list_conversations(&self, page: u32, page_size: u32) -> Result<ConversationPage, PersistError> {
        self.check()?;
        let mut conversations: Vec<ConversationSummary> = self
            .conversations
            .lock()
            .unwrap()
            .values()
            .map(|c| c.summary.clone())
            .collect();
        conversations.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(ConversationPage {
            total: conversations.len() as u64,
            conversations,
            page,
            page_size,
        })
    }

    async fn create_conversation(&self, title: &str) -> Result<Conversation, PersistError> {
        self.check()?;
        let conversation = Conversation::new(
            ConversationSummary::new(format!("c{}", title.len()), title),
            Vec::new(),
        );
        self.conversations
            .lock()
            .unwrap()
            .insert(conversation.id().to_string(), conversation.clone());
        Ok(conversation)
    }

    async fn get_conversation(&self, conversation_id: &str) -> Result<Conversation, PersistError> {
        self.check()?;
        self.conversations
            .lock()
            .unwrap()
            .get(conversation_id)
            .cloned()
            .ok_or_else(|| PersistError::NotFound(conversation_id.to_string()))
    }

    async fn get_conversation_messages(&self, conversation_id: &str) -> Result<Vec<Message>, PersistError> {
        self.get_conversation(conversation_id).await.map(|c| c.messages)
    }

    async fn delete_conversation(&self, conversation_id: &str) -> Result<(), PersistError> {
        self.check()?;
        self.conversations.lock().unwrap().remove(conversation_id);
        Ok(())
    }

    async fn clear_conversation_messages(&self, conversation_id: &str) -> Result<(), PersistError> {
        self.check()?;
        if let Some(c) = self.conversations.lock().unwrap().get_mut(conversation_id) {
            c.messages.clear();
        }
        Ok(())
    }
}

#[derive(Default)]
struct Transcript {
    updates: Mutex<Vec<String>>,
    completed: Mutex<usize>,
    failed: Mutex<Vec<String>>,
}

impl StoreObserver for Transcript {
    fn on_event(&self, event: StoreEvent<'_>) {
        match event {
            StoreEvent::MessageUpdated(m) => self.updates.lock().unwrap().push(m.content.clone()),
            StoreEvent::StreamCompleted => *self.completed.lock().unwrap() += 1,
            StoreEvent::StreamFailed { error } => self.failed.lock().unwrap().push(error.to_string()),
            _ => {}
        }
    }
}

fn create(id: &str) -> Result<ChatEvent, StreamError> {
    Ok(ChatEvent::MessageCreate {
        message_id: id.to_string(),
        created_at: None,
    })
}

fn chunk(id: &str, index: u64, content: &str) -> Result<ChatEvent, StreamError> {
    Ok(ChatEvent::MessageChunk {
        message_id: id.to_string(),
        index,
        content: content.to_string(),
    })
}

fn store(transport: Arc<ScriptedTransport>, backend: Arc<MemoryConversations>) -> ChatStore {
    ChatStore::new(transport, backend)
}

#[tokio::test]
async fn test_hello_scenario() {
    let transport = ScriptedTransport::new(vec![Ok(vec![
        create("m1"),
        chunk("m1", 0, "Hi"),
        chunk("m1", 1, " there"),
    ])]);
    let observer = Arc::new(Transcript::default());
    let mut store = store(transport.clone(), MemoryConversations::with(vec![]))
        .with_observer(observer.clone());

    store.send_message("Hello").await;

    let messages = store.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(messages[0].content, "Hello");
    assert_eq!(messages[1].id, "m1");
    assert_eq!(messages[1].role, MessageRole::Assistant);
    assert_eq!(messages[1].content, "Hi there");
    assert!(!store.state().is_streaming);
    assert!(!store.state().is_loading);
    assert!(store.error().is_none());

    assert_eq!(*observer.updates.lock().unwrap(), vec!["Hi", "Hi there"]);
    assert_eq!(*observer.completed.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_http_500_scenario() {
    let transport = ScriptedTransport::new(vec![Err(StreamError::Status {
        status: 500,
        body: "boom".to_string(),
    })]);
    let observer = Arc::new(Transcript::default());
    let mut store = store(transport, MemoryConversations::with(vec![])).with_observer(observer.clone());

    store.send_message("Hello").await;

    let error = store.error().unwrap();
    assert!(!error.is_empty());
    assert!(error.contains("500"));
    assert!(!store.state().is_loading);
    assert!(!store.state().is_streaming);
    assert_eq!(store.messages().len(), 1);
    assert!(store.messages().iter().all(|m| m.role != MessageRole::Assistant));
    assert_eq!(observer.failed.lock().unwrap().len(), 1);
    assert_eq!(*observer.completed.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_server_error_frame_removes_placeholder() {
    let transport = ScriptedTransport::new(vec![Ok(vec![
        create("m1"),
        Err(StreamError::Server("quota exceeded".to_string())),
    ])]);
    let mut store = store(transport, MemoryConversations::with(vec![]));

    store.send_message("Hello").await;

    assert_eq!(store.error(), Some("quota exceeded"));
    assert_eq!(store.messages().len(), 1);
    assert!(store.state().current_assistant_message_id.is_none());
}

#[tokio::test]
async fn test_tool_flow_and_history_filtering() {
    let transport = ScriptedTransport::new(vec![
        Ok(vec![
            Ok(ChatEvent::ToolCall {
                status: ToolCallStatus::Calling,
                content: "正在调用工具: search".to_string(),
            }),
            Ok(ChatEvent::ToolResult {
                status: ToolCallStatus::Failed,
                content: "工具 search 调用失败".to_string(),
            }),
            create("m1"),
            chunk("m1", 0, "Search is down"),
        ]),
        Ok(vec![create("m2"), chunk("m2", 0, "ok")]),
    ]);
    let mut store = store(transport.clone(), MemoryConversations::with(vec![]));

    store.send_message("Find flights").await;

    let messages = store.messages();
    assert_eq!(messages.len(), 4);
    let call = &messages[1];
    let result = &messages[2];
    assert_eq!(call.message_type, MessageType::ToolCallStatus);
    assert_eq!(result.message_type, MessageType::ToolResult);

    let call_status = store.tool_status(&call.id);
    assert_eq!(call_status.len(), 1);
    assert_eq!(call_status[0].0, "search");
    assert_eq!(call_status[0].1.status, ToolCallStatus::Failed);
    assert_eq!(store.tool_status(&result.id)[0].1.status, ToolCallStatus::Failed);
    assert!(store.tool_status("unknown").is_empty());

    store.send_message("Try again").await;

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].messages.len(), 1);
    // Tool-result message stays local
    assert_eq!(requests[1].messages.len(), 4);
    assert!(requests[1].messages.iter().all(|m| m.role != MessageRole::Tool));
    assert_eq!(store.messages().len(), 6);
}

#[tokio::test]
async fn test_model_option_is_sent() {
    let transport = ScriptedTransport::new(vec![Ok(vec![])]);
    let mut store = store(transport.clone(), MemoryConversations::with(vec![])).with_options(StoreOptions {
        model: Some("trip-planner".to_string()),
        page_size: 10,
    });

    store.send_message("Hello").await;

    assert_eq!(transport.requests()[0].model.as_deref(), Some("trip-planner"));
    assert!(transport.requests()[0].stream);
}

#[tokio::test]
async fn test_blank_message_does_not_open_stream() {
    let transport = ScriptedTransport::new(vec![]);
    let mut store = store(transport.clone(), MemoryConversations::with(vec![]));

    store.send_message("   ").await;

    assert!(transport.requests().is_empty());
    assert!(store.messages().is_empty());
}

#[tokio::test]
async fn test_open_conversation_rebuilds_tool_index() {
    let history = vec![
        Message::new("u1", MessageRole::User, "weather in Oslo?", MessageType::Normal),
        Message::new(
            "t1",
            MessageRole::Assistant,
            r#"{"tool_calls":[{"id":"call_1","function":{"name":"weather","arguments":"{}"}}]}"#,
            MessageType::ToolCallStatus,
        ),
        Message::new(
            "r1",
            MessageRole::Tool,
            r#"{"tool_name":"weather","success":false,"result":"timeout"}"#,
            MessageType::ToolResult,
        ),
    ];
    let backend = MemoryConversations::with(vec![Conversation::new(
        ConversationSummary::new("c1", "Oslo"),
        history,
    )]);
    let mut store = store(ScriptedTransport::new(vec![]), backend);

    store.open_conversation("c1").await.unwrap();

    assert_eq!(store.state().current_conversation_id(), Some("c1"));
    assert_eq!(store.messages().len(), 3);
    assert_eq!(store.state().tool_status.len(), 2);
    // Replayed calls read as success even though the result failed
    assert_eq!(store.tool_status("t1")[0].1.status, ToolCallStatus::Success);
    assert_eq!(store.tool_status("r1")[0].1.status, ToolCallStatus::Failed);
}

#[tokio::test]
async fn test_open_missing_conversation_records_error() {
    let mut store = store(ScriptedTransport::new(vec![]), MemoryConversations::with(vec![]));

    let err = store.open_conversation("nope").await.unwrap_err();

    assert!(matches!(err, PersistError::NotFound(_)));
    assert!(store.error().unwrap().contains("nope"));
}

#[tokio::test]
async fn test_create_send_and_reorder() {
    let backend = MemoryConversations::with(vec![
        Conversation::new(ConversationSummary::new("a", "Older"), Vec::new()),
        Conversation::new(ConversationSummary::new("b", "Old"), Vec::new()),
    ]);
    let transport = ScriptedTransport::new(vec![Ok(vec![create("m1"), chunk("m1", 0, "Let's plan it")])]);
    let mut store = store(transport, backend);

    let listed = store.refresh_conversations().await;
    assert_eq!(listed.len(), 2);
    assert!(!store.state().is_conversation_loading);

    let created = store.create_conversation("New trip").await.unwrap();
    assert_eq!(store.conversations()[0].id, created.id);
    assert_eq!(created.latest_message_preview.as_deref(), Some("New trip"));
    assert_eq!(store.state().current_conversation_id(), Some(created.id.as_str()));

    store.send_message("A long weekend in the Scottish Highlands").await;

    let first = &store.conversations()[0];
    assert_eq!(first.id, created.id);
    assert_eq!(first.title, "A long weekend in the Scottish...");
    assert_eq!(first.latest_message_preview.as_deref(), Some("Let's plan it"));
    assert_eq!(store.state().current_conversation.as_ref(), Some(first));
    let rest: Vec<_> = store.conversations()[1..].iter().map(|c| c.id.as_str()).collect();
    assert_eq!(rest, vec!["a", "b"]);
}

#[tokio::test]
async fn test_delete_and_clear() {
    let backend = MemoryConversations::with(vec![
        Conversation::new(ConversationSummary::new("a", "A"), vec![Message::user("hi")]),
        Conversation::new(ConversationSummary::new("b", "B"), vec![Message::user("yo")]),
    ]);
    let mut store = store(ScriptedTransport::new(vec![]), backend.clone());

    store.refresh_conversations().await;
    store.open_conversation("a").await.unwrap();

    store.clear_conversation_messages("a").await.unwrap();
    assert!(store.messages().is_empty());
    let a = store.conversations().iter().find(|c| c.id == "a").unwrap();
    assert_eq!(a.latest_message_preview.as_deref(), Some(""));

    store.delete_conversation("a").await.unwrap();
    assert!(store.state().current_conversation.is_none());
    assert_eq!(store.conversations().len(), 1);

    backend.fail_next(503);
    let err = store.delete_conversation("b").await.unwrap_err();
    assert!(matches!(err, PersistError::Status { status: 503, .. }));
    assert_eq!(store.conversations().len(), 1);
    assert!(store.error().unwrap().contains("backend unavailable"));
}

#[tokio::test]
async fn test_refresh_failure_returns_empty() {
    let backend = MemoryConversations::with(vec![Conversation::new(
        ConversationSummary::new("a", "A"),
        Vec::new(),
    )]);
    let mut store = store(ScriptedTransport::new(vec![]), backend.clone());

    backend.fail_next(500);
    assert!(store.refresh_conversations().await.is_empty());
    assert!(store.error().is_some());
    assert!(!store.state().is_conversation_loading);
}

#[tokio::test]
async fn test_fetch_messages_leaves_state_alone() {
    let backend = MemoryConversations::with(vec![Conversation::new(
        ConversationSummary::new("a", "A"),
        vec![Message::user("hi"), Message::user("again")],
    )]);
    let mut store = store(ScriptedTransport::new(vec![]), backend);

    let fetched = store.fetch_conversation_messages("a").await.unwrap();

    assert_eq!(fetched.len(), 2);
    assert!(store.messages().is_empty());
    assert!(store.state().current_conversation.is_none());
}
