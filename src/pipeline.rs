//! Document ingestion: chunk → embed → store.
//!
//! [`IngestionPipeline`] adds a document's full text to the knowledge base.
//! Ingestion is fail-fast: any failing step aborts the document and surfaces
//! the error to the caller. Embeddings for every chunk are computed before
//! any storage write, and the chunks land as one batch, so a failed
//! ingestion leaves no partial chunk set behind.
//!
//! # Example
//!
//! ```rust,ignore
//! use chatfolio::{IngestionPipeline, RagConfig, InMemoryStore, FixedWindowChunker};
//!
//! let pipeline = IngestionPipeline::builder()
//!     .config(RagConfig::default())
//!     .chunker(Arc::new(FixedWindowChunker::new(1000, 200)?))
//!     .embedder(Arc::new(my_embedder))
//!     .vector_store(store.clone())
//!     .document_store(store)
//!     .build()?;
//!
//! pipeline.ingest_document(&document).await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::chunking::{Chunker, FixedWindowChunker};
use crate::config::RagConfig;
use crate::document::{Chunk, Document, FileType};
use crate::embedding::EmbeddingProvider;
use crate::error::{Error, Result};
use crate::vectorstore::{DocumentStore, VectorStore};

/// The ingestion pipeline orchestrator.
pub struct IngestionPipeline {
    config: RagConfig,
    chunker: Arc<dyn Chunker>,
    embedder: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    document_store: Arc<dyn DocumentStore>,
}

impl IngestionPipeline {
    /// Create a new [`IngestionPipelineBuilder`].
    pub fn builder() -> IngestionPipelineBuilder {
        IngestionPipelineBuilder::default()
    }

    /// The pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Ingest raw text for an existing document: chunk → embed → store.
    ///
    /// Each stored chunk gets a fresh unique ID and the given metadata plus
    /// `chunk_index` and `total_chunks`. Returns the stored chunks.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::EmbeddingUnavailable`] and
    /// [`Error::StorageUnavailable`] unchanged; ingestion is fail-fast.
    pub async fn ingest(
        &self,
        document_id: &str,
        text: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<Vec<Chunk>> {
        let windows = self.chunker.chunk(text);
        if windows.is_empty() {
            info!(document_id, chunk_count = 0, "ingested document (empty)");
            return Ok(Vec::new());
        }

        let texts: Vec<&str> = windows.iter().map(String::as_str).collect();
        let embeddings = self.embedder.embed_batch(&texts).await.map_err(|e| {
            error!(document_id, error = %e, "embedding failed during ingestion");
            e
        })?;

        let dimensions = self.embedder.dimensions();
        if embeddings.iter().any(|e| e.len() != dimensions) {
            return Err(Error::Ingestion(format!(
                "embedding dimensionality mismatch for document '{document_id}' (expected {dimensions})"
            )));
        }

        let total_chunks = windows.len();
        let chunks: Vec<Chunk> = windows
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(index, (content, embedding))| {
                let mut metadata = metadata.clone();
                metadata.insert("chunk_index".to_string(), index.to_string());
                metadata.insert("total_chunks".to_string(), total_chunks.to_string());
                Chunk {
                    id: Uuid::new_v4().to_string(),
                    document_id: document_id.to_string(),
                    content,
                    embedding,
                    metadata,
                }
            })
            .collect();

        self.vector_store.insert(&chunks).await.map_err(|e| {
            error!(document_id, error = %e, "chunk insert failed during ingestion");
            e
        })?;

        info!(document_id, chunk_count = chunks.len(), "ingested document");
        Ok(chunks)
    }

    /// Persist a document record, then ingest its content.
    ///
    /// The stored chunks carry `title` and `file_type` source tags so
    /// retrieval can attribute them without a join.
    pub async fn ingest_document(&self, document: &Document) -> Result<Vec<Chunk>> {
        self.document_store.insert_document(document).await?;

        let metadata = HashMap::from([
            ("title".to_string(), document.title.clone()),
            ("file_type".to_string(), document.file_type.to_string()),
        ]);
        self.ingest(&document.id, &document.content, &metadata).await
    }

    /// Capture raw text pasted into the conversation as a new document.
    ///
    /// Synthesizes a title and file name from the current timestamp and
    /// ingests the text with a `source: chat` tag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedInput`] for empty or whitespace-only
    /// text; ingestion errors propagate as from [`ingest`](Self::ingest).
    pub async fn capture_pasted_text(&self, text: &str) -> Result<Document> {
        if text.trim().is_empty() {
            return Err(Error::UnsupportedInput("pasted text is empty".to_string()));
        }

        let now = Utc::now();
        let document = Document {
            id: Uuid::new_v4().to_string(),
            title: format!("Pasted text {}", now.to_rfc3339()),
            content: text.to_string(),
            file_type: FileType::Txt,
            file_name: format!("pasted-{}.txt", now.timestamp_millis()),
            file_size: text.len() as u64,
            uploaded_by: "anonymous".to_string(),
            created_at: now,
        };

        self.document_store.insert_document(&document).await?;

        let metadata = HashMap::from([
            ("title".to_string(), document.title.clone()),
            ("file_type".to_string(), document.file_type.to_string()),
            ("source".to_string(), "chat".to_string()),
        ]);
        self.ingest(&document.id, text, &metadata).await?;

        Ok(document)
    }
}

/// Builder for an [`IngestionPipeline`].
///
/// The embedder and both stores are required. `config` defaults; the
/// chunker defaults to a [`FixedWindowChunker`] sized from the config, so
/// the configured chunk sizing and the actual windowing cannot disagree
/// unless a custom chunker is injected explicitly.
#[derive(Default)]
pub struct IngestionPipelineBuilder {
    config: Option<RagConfig>,
    chunker: Option<Arc<dyn Chunker>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    document_store: Option<Arc<dyn DocumentStore>>,
}

impl IngestionPipelineBuilder {
    /// Set the retrieval configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the document store backend.
    pub fn document_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.document_store = Some(store);
        self
    }

    /// Build the pipeline, validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if any required field is missing,
    /// or if no chunker was given and the config's chunk sizing is
    /// degenerate.
    pub fn build(self) -> Result<IngestionPipeline> {
        let config = self.config.unwrap_or_default();
        let chunker: Arc<dyn Chunker> = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(FixedWindowChunker::new(config.chunk_size, config.chunk_overlap)?),
        };
        let embedder = self
            .embedder
            .ok_or_else(|| Error::InvalidConfig("embedder is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| Error::InvalidConfig("vector_store is required".to_string()))?;
        let document_store = self
            .document_store
            .ok_or_else(|| Error::InvalidConfig("document_store is required".to_string()))?;

        Ok(IngestionPipeline { config, chunker, embedder, vector_store, document_store })
    }
}
