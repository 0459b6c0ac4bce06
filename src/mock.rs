//! Deterministic test doubles for the external capabilities.
//!
//! Exported so downstream users can exercise the pipeline without live
//! providers, mirroring how tests in this crate use them.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde_json::Value;

use crate::document::{Chunk, ChunkMatch, Document};
use crate::embedding::EmbeddingProvider;
use crate::error::{Error, Result};
use crate::model::{ChatEvent, ChatModel, ChatRequest, ChatStream, StructuredGenerator};
use crate::vectorstore::{DocumentStore, VectorStore};

/// A deterministic embedding provider.
///
/// Embeddings are derived from an FNV-1a hash of the text, so identical
/// texts always produce identical (normalized) vectors.
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    dimensions: usize,
}

impl MockEmbedder {
    /// Create a mock embedder with the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(32)
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut state: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in text.bytes() {
            state ^= u64::from(byte);
            state = state.wrapping_mul(0x0000_0100_0000_01b3);
        }

        let mut vector = Vec::with_capacity(self.dimensions);
        for i in 0..self.dimensions {
            let mut x = state.wrapping_add(i as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
            x ^= x >> 33;
            vector.push(((x % 2000) as f32 / 1000.0) - 1.0);
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// An embedding provider that always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::EmbeddingUnavailable {
            provider: "mock".to_string(),
            message: "embedding capability is down".to_string(),
        })
    }

    fn dimensions(&self) -> usize {
        32
    }
}

/// A vector/document store that fails every operation, for exercising the
/// fail-soft retrieval path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStore;

impl FailingStore {
    fn err<T>() -> Result<T> {
        Err(Error::StorageUnavailable {
            backend: "mock".to_string(),
            message: "store is down".to_string(),
        })
    }
}

#[async_trait]
impl VectorStore for FailingStore {
    async fn insert(&self, _chunks: &[Chunk]) -> Result<()> {
        Self::err()
    }

    async fn search(&self, _embedding: &[f32], _limit: usize) -> Result<Vec<ChunkMatch>> {
        Self::err()
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn insert_document(&self, _document: &Document) -> Result<()> {
        Self::err()
    }

    async fn fetch_documents(&self, _ids: &[String]) -> Result<Vec<Document>> {
        Self::err()
    }
}

/// A scripted chat model.
///
/// Each call to [`stream_chat`](ChatModel::stream_chat) consumes the next
/// script and replays its events. Requests are recorded for inspection.
/// When `hang_after_scripts` is set, a call past the last script yields
/// nothing and pends forever — useful for cancellation tests.
pub struct MockChatModel {
    scripts: Mutex<VecDeque<Vec<ChatEvent>>>,
    requests: Mutex<Vec<ChatRequest>>,
    hang_after_scripts: bool,
}

impl MockChatModel {
    /// Create a model that replays the given scripts, one per call.
    pub fn new(scripts: Vec<Vec<ChatEvent>>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            requests: Mutex::new(Vec::new()),
            hang_after_scripts: false,
        }
    }

    /// Create a model that streams the given events once, then pends
    /// forever on subsequent calls.
    pub fn hanging_after(script: Vec<ChatEvent>) -> Self {
        Self {
            scripts: Mutex::new(VecDeque::from([script])),
            requests: Mutex::new(Vec::new()),
            hang_after_scripts: true,
        }
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    fn name(&self) -> &str {
        "mock-chat"
    }

    async fn stream_chat(&self, request: ChatRequest) -> Result<ChatStream> {
        self.requests.lock().expect("mock lock poisoned").push(request);

        let script = self.scripts.lock().expect("mock lock poisoned").pop_front();
        match script {
            Some(events) => Ok(stream::iter(events.into_iter().map(Ok)).boxed()),
            None if self.hang_after_scripts => Ok(stream::pending().boxed()),
            None => Ok(stream::iter([Ok(ChatEvent::TextDelta("…".to_string()))]).boxed()),
        }
    }
}

/// A scripted structured generator.
///
/// Each call pops the next queued response; an exhausted queue fails the
/// call. The call counter lets tests assert the capability was never hit.
pub struct MockStructuredGenerator {
    responses: Mutex<VecDeque<std::result::Result<Value, String>>>,
    calls: AtomicUsize,
}

impl MockStructuredGenerator {
    /// Create a generator that returns the given values in order.
    pub fn new(responses: Vec<Value>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Ok).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a generator whose every call fails.
    pub fn failing() -> Self {
        Self { responses: Mutex::new(VecDeque::new()), calls: AtomicUsize::new(0) }
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StructuredGenerator for MockStructuredGenerator {
    async fn generate_json(&self, _system: &str, _prompt: &str, _schema: &Value) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.responses.lock().expect("mock lock poisoned").pop_front();
        match next {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(Error::Model(message)),
            None => Err(Error::Model("mock generator exhausted".to_string())),
        }
    }
}
