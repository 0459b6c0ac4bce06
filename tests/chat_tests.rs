//! End-to-end orchestrator flows with scripted capabilities.

use std::sync::Arc;

use async_trait::async_trait;
use chatfolio::chat::ChatOrchestrator;
use chatfolio::chunking::FixedWindowChunker;
use chatfolio::config::ChatConfig;
use chatfolio::inmemory::InMemoryStore;
use chatfolio::intent::IntentRouter;
use chatfolio::mock::{MockChatModel, MockEmbedder, MockStructuredGenerator};
use chatfolio::model::{ChatEvent, ChatModel, ChatRequest, ChatStream, Message, ToolCall};
use chatfolio::pipeline::IngestionPipeline;
use chatfolio::retriever::{ContextRetriever, NO_CONTEXT_AVAILABLE};
use chatfolio::tools::{ShowWorkTimeline, UploadRawTextToRag};
use chatfolio::Result;
use futures::stream::{self, StreamExt};
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// A model whose stream yields one delta, then never ends.
struct StallingModel;

#[async_trait]
impl ChatModel for StallingModel {
    fn name(&self) -> &str {
        "stalling"
    }

    async fn stream_chat(&self, _request: ChatRequest) -> Result<ChatStream> {
        let head = stream::iter([Ok(ChatEvent::TextDelta("partial".to_string()))]);
        Ok(head.chain(stream::pending()).boxed())
    }
}

struct Harness {
    store: Arc<InMemoryStore>,
    orchestrator: ChatOrchestrator,
}

/// Wire an orchestrator over an empty in-memory store and the given model,
/// with the upload and timeline tools attached.
fn harness(model: Arc<dyn ChatModel>) -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let embedder = Arc::new(MockEmbedder::default());

    let pipeline = Arc::new(
        IngestionPipeline::builder()
            .chunker(Arc::new(FixedWindowChunker::new(1000, 200).unwrap()))
            .embedder(embedder.clone())
            .vector_store(store.clone())
            .document_store(store.clone())
            .build()
            .unwrap(),
    );
    let retriever = ContextRetriever::new(embedder, store.clone(), store.clone());
    let router = IntentRouter::new(store.clone(), Arc::new(MockStructuredGenerator::failing()));

    let orchestrator = ChatOrchestrator::builder()
        .config(ChatConfig::default())
        .model(model)
        .intent_router(Arc::new(router))
        .retriever(Arc::new(retriever))
        .tool(Arc::new(ShowWorkTimeline))
        .tool(Arc::new(UploadRawTextToRag::new(pipeline)))
        .build()
        .unwrap();

    Harness { store, orchestrator }
}

async fn collect(mut stream: ChatStream) -> Vec<ChatEvent> {
    let mut events = Vec::new();
    while let Some(event) = stream.next().await {
        events.push(event.unwrap());
    }
    events
}

#[tokio::test]
async fn plain_question_streams_text_without_tools() {
    let model = Arc::new(MockChatModel::new(vec![vec![
        ChatEvent::TextDelta("Hello".to_string()),
        ChatEvent::TextDelta(" there".to_string()),
    ]]));
    let h = harness(model.clone());

    let events = collect(h.orchestrator.chat(
        vec![Message::user("Who are you?")],
        CancellationToken::new(),
    ))
    .await;

    assert_eq!(
        events,
        vec![
            ChatEvent::TextDelta("Hello".to_string()),
            ChatEvent::TextDelta(" there".to_string()),
        ]
    );

    // With nothing ingested, the prompt carries the no-context sentinel
    let requests = model.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].system.contains(NO_CONTEXT_AVAILABLE));
    assert!(requests[0].system.contains("AVAILABLE TOOLS:"));
    assert_eq!(requests[0].tools.len(), 2);
}

#[tokio::test]
async fn large_paste_is_ingested_before_generation() {
    let model = Arc::new(MockChatModel::new(vec![vec![ChatEvent::TextDelta(
        "Got it, stored for future questions.".to_string(),
    )]]));
    let h = harness(model.clone());

    let paste = "lorem ipsum dolor sit amet ".repeat(60);
    let events = collect(
        h.orchestrator
            .chat(vec![Message::user(paste)], CancellationToken::new()),
    )
    .await;

    // Upload round-trip first, then the model's confirmation text
    assert_eq!(events.len(), 3);
    let ChatEvent::ToolCall(call) = &events[0] else {
        panic!("expected a tool call, got {:?}", events[0]);
    };
    assert_eq!(call.name, "uploadRawTextToRag");
    let ChatEvent::ToolResult(result) = &events[1] else {
        panic!("expected a tool result, got {:?}", events[1]);
    };
    assert_eq!(result.result.get("uploaded"), Some(&json!(true)));
    assert!(matches!(events[2], ChatEvent::TextDelta(_)));

    assert_eq!(h.store.document_count().await, 1);
    assert_eq!(h.store.chunk_count().await, 3);

    let requests = model.requests();
    assert!(requests[0].system.contains("pasted text was just ingested"));
}

#[tokio::test]
async fn question_shaped_paste_is_not_ingested() {
    let model = Arc::new(MockChatModel::new(vec![vec![ChatEvent::TextDelta(
        "Answering instead.".to_string(),
    )]]));
    let h = harness(model.clone());

    let question = format!("Can you summarize this? {}", "filler ".repeat(200));
    let events = collect(
        h.orchestrator
            .chat(vec![Message::user(question)], CancellationToken::new()),
    )
    .await;

    assert_eq!(events, vec![ChatEvent::TextDelta("Answering instead.".to_string())]);
    assert_eq!(h.store.document_count().await, 0);
}

#[tokio::test]
async fn tool_calls_round_trip_back_into_history() {
    let model = Arc::new(MockChatModel::new(vec![
        vec![
            ChatEvent::TextDelta("Let me show you.".to_string()),
            ChatEvent::ToolCall(ToolCall {
                id: "call_1".to_string(),
                name: "showWorkTimeline".to_string(),
                arguments: json!({}),
            }),
        ],
        vec![ChatEvent::TextDelta("Here it is.".to_string())],
    ]));
    let h = harness(model.clone());

    let events = collect(h.orchestrator.chat(
        vec![Message::user("show me your work history")],
        CancellationToken::new(),
    ))
    .await;

    assert_eq!(events.len(), 4);
    assert!(matches!(&events[0], ChatEvent::TextDelta(t) if t == "Let me show you."));
    assert!(matches!(&events[1], ChatEvent::ToolCall(c) if c.name == "showWorkTimeline"));
    let ChatEvent::ToolResult(result) = &events[2] else {
        panic!("expected a tool result, got {:?}", events[2]);
    };
    assert_eq!(result.id, "call_1");
    assert_eq!(result.result.get("displayed"), Some(&json!(true)));
    assert!(matches!(&events[3], ChatEvent::TextDelta(t) if t == "Here it is."));

    // The follow-up request sees the call and its result
    let requests = model.requests();
    assert_eq!(requests.len(), 2);
    let history = &requests[1].messages;
    assert!(history.iter().any(|m| matches!(m, Message::ToolCall(c) if c.id == "call_1")));
    assert!(history.iter().any(|m| matches!(m, Message::ToolResult(r) if r.id == "call_1")));
}

#[tokio::test]
async fn unknown_tool_requests_get_error_payloads() {
    let model = Arc::new(MockChatModel::new(vec![
        vec![ChatEvent::ToolCall(ToolCall {
            id: "call_1".to_string(),
            name: "launchMissiles".to_string(),
            arguments: json!({}),
        })],
        vec![ChatEvent::TextDelta("Sorry, can't do that.".to_string())],
    ]));
    let h = harness(model);

    let events = collect(h.orchestrator.chat(
        vec![Message::user("do something odd")],
        CancellationToken::new(),
    ))
    .await;

    let result = events
        .iter()
        .find_map(|e| match e {
            ChatEvent::ToolResult(r) => Some(r),
            _ => None,
        })
        .expect("missing tool result");
    assert!(result.result.get("error").is_some());
}

#[tokio::test]
async fn cancellation_stops_the_stream_without_error() {
    let h = harness(Arc::new(StallingModel));
    let token = CancellationToken::new();

    let mut stream = h
        .orchestrator
        .chat(vec![Message::user("tell me everything")], token.clone());

    let first = stream.next().await.expect("expected the first delta").unwrap();
    assert_eq!(first, ChatEvent::TextDelta("partial".to_string()));

    token.cancel();
    assert!(stream.next().await.is_none());
}
