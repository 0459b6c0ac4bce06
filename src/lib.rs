//! # chatfolio
//!
//! Conversational resume engine: retrieval-augmented chat over uploaded
//! documents, with intent-driven UI component routing and streaming tool
//! round-trips.
//!
//! ## Overview
//!
//! The crate is organized around a handful of capability traits, each with
//! at least one in-process implementation and one wire-level adapter:
//!
//! - [`Chunker`] / [`FixedWindowChunker`] - split text into overlapping
//!   windows for embedding
//! - [`EmbeddingProvider`] - turn text into vectors (OpenAI adapter behind
//!   the `openai` feature, [`mock::MockEmbedder`] for tests)
//! - [`VectorStore`] / [`DocumentStore`] / [`ComponentRegistry`] - storage
//!   seams, backed by [`InMemoryStore`] or Postgres+pgvector (behind the
//!   `pgvector` feature)
//! - [`ChatModel`] / [`StructuredGenerator`] - streaming chat and
//!   JSON-schema-constrained generation
//!
//! On top of those sit the composed services:
//!
//! - [`IngestionPipeline`] - chunk, embed, and store a document's text
//! - [`ContextRetriever`] - embed a query, search, and format matched
//!   chunks into a prompt block
//! - [`IntentRouter`] - decide whether a message should surface a UI
//!   component, validated against the registry
//! - [`ChatOrchestrator`] - the full conversation loop: intent detection
//!   and retrieval in parallel, system prompt assembly, streaming with
//!   tool execution rounds, cancellation
//! - [`SuggestionEngine`] - cached follow-up prompt suggestions
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use chatfolio::{
//!     ChatConfig, ChatOrchestrator, ContextRetriever, FixedWindowChunker,
//!     IngestionPipeline, InMemoryStore, IntentRouter, Message, RagConfig,
//! };
//! use chatfolio::openai::{OpenAIEmbeddingProvider, OpenAIStructuredGenerator};
//! use tokio_util::sync::CancellationToken;
//!
//! let store = Arc::new(InMemoryStore::new());
//! let embedder = Arc::new(OpenAIEmbeddingProvider::from_env()?);
//!
//! let pipeline = Arc::new(
//!     IngestionPipeline::builder()
//!         .config(RagConfig::default())
//!         .chunker(Arc::new(FixedWindowChunker::new(1000, 200)?))
//!         .embedder(embedder.clone())
//!         .vector_store(store.clone())
//!         .document_store(store.clone())
//!         .build()?,
//! );
//!
//! let retriever = ContextRetriever::new(embedder, store.clone(), store.clone());
//! let generator = Arc::new(OpenAIStructuredGenerator::from_env()?);
//! let router = IntentRouter::new(store.clone(), generator);
//!
//! let orchestrator = ChatOrchestrator::builder()
//!     .config(ChatConfig::default())
//!     .model(my_model)
//!     .intent_router(Arc::new(router))
//!     .retriever(Arc::new(retriever))
//!     .tool(Arc::new(chatfolio::tools::ShowWorkTimeline))
//!     .build()?;
//!
//! let mut events = orchestrator.chat(
//!     vec![Message::user("Tell me about your work experience")],
//!     CancellationToken::new(),
//! );
//! ```
//!
//! ## Features
//!
//! - `openai` (default) - OpenAI embeddings and structured generation
//! - `pgvector` - Postgres+pgvector storage backend
//! - `full` - everything

pub mod cache;
pub mod chat;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod inmemory;
pub mod intent;
pub mod mock;
pub mod model;
pub mod pipeline;
pub mod registry;
pub mod retriever;
pub mod suggestions;
pub mod tools;
pub mod vectorstore;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "pgvector")]
pub mod pgvector;

pub use cache::{InMemoryTtlCache, NoopCache, SuggestionCache};
pub use chat::{ChatOrchestrator, ChatOrchestratorBuilder};
pub use chunking::{Chunker, FixedWindowChunker};
pub use config::{ChatConfig, RagConfig, RagConfigBuilder, DEFAULT_PERSONA};
pub use document::{Chunk, ChunkMatch, Document, FileType, RetrievedContext};
pub use embedding::EmbeddingProvider;
pub use error::{Error, Result};
pub use inmemory::InMemoryStore;
pub use intent::{IntentDecision, IntentRouter};
pub use model::{
    ChatEvent, ChatModel, ChatRequest, ChatStream, Message, Role, StructuredGenerator, ToolCall,
    ToolResult, ToolSpec,
};
pub use pipeline::{IngestionPipeline, IngestionPipelineBuilder};
pub use registry::{ComponentDescriptor, ComponentRegistry};
pub use retriever::{format_context_for_prompt, ContextRetriever, NO_CONTEXT_AVAILABLE};
pub use suggestions::{SuggestionEngine, DEFAULT_SUGGESTIONS};
pub use tools::{
    ShowEducation, ShowPersonalPassions, ShowWorkTimeline, Tool, UploadRawTextToRag,
    UPLOAD_RAW_TEXT_TOOL,
};
pub use vectorstore::{DocumentStore, VectorStore};

#[cfg(feature = "pgvector")]
pub use pgvector::PgVectorStore;
