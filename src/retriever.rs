//! Query-time context retrieval and prompt formatting.
//!
//! [`ContextRetriever`] embeds a query, searches the vector store, and joins
//! the matches back to their source documents. The whole path is fail-soft:
//! every failure degrades to "no extra context" so the conversation layer
//! stays responsive even when the embedder or store is down.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::RagConfig;
use crate::document::RetrievedContext;
use crate::embedding::EmbeddingProvider;
use crate::vectorstore::{DocumentStore, VectorStore};

/// Sentinel returned by [`format_context_for_prompt`] for an empty context
/// list.
pub const NO_CONTEXT_AVAILABLE: &str = "No additional context available.";

/// Source title used when a chunk's document no longer exists.
const UNKNOWN_SOURCE: &str = "Unknown";

/// Retrieves and ranks knowledge-base context for a query.
pub struct ContextRetriever {
    config: RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    document_store: Arc<dyn DocumentStore>,
}

impl ContextRetriever {
    /// Create a new retriever over the given capabilities, with the default
    /// [`RagConfig`].
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
        document_store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self { config: RagConfig::default(), embedder, vector_store, document_store }
    }

    /// Override the retrieval configuration.
    pub fn with_config(mut self, config: RagConfig) -> Self {
        self.config = config;
        self
    }

    /// The retrieval configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Retrieve up to `top_k` contexts relevant to `query`, ordered by
    /// descending similarity. Matches scoring below the configured
    /// similarity threshold are dropped.
    ///
    /// Never fails: empty/blank queries, embedding failures, and store
    /// failures all yield an empty list.
    pub async fn retrieve(&self, query: &str) -> Vec<RetrievedContext> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let query_embedding = match self.embedder.embed(query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!(error = %e, "query embedding failed; returning no context");
                return Vec::new();
            }
        };

        let matches = match self.vector_store.search(&query_embedding, self.config.top_k).await {
            Ok(matches) => matches,
            Err(e) => {
                warn!(error = %e, "vector search failed; returning no context");
                return Vec::new();
            }
        };
        let matches: Vec<_> = matches
            .into_iter()
            .filter(|m| m.similarity >= self.config.similarity_threshold)
            .collect();

        // Distinct document IDs, preserving match order
        let mut seen = HashSet::new();
        let document_ids: Vec<String> = matches
            .iter()
            .filter(|m| seen.insert(m.document_id.clone()))
            .map(|m| m.document_id.clone())
            .collect();

        let documents = match self.document_store.fetch_documents(&document_ids).await {
            Ok(documents) => documents,
            Err(e) => {
                warn!(error = %e, "document lookup failed; returning no context");
                return Vec::new();
            }
        };
        let titles: HashMap<&str, &crate::document::Document> =
            documents.iter().map(|d| (d.id.as_str(), d)).collect();

        let contexts: Vec<RetrievedContext> = matches
            .into_iter()
            .map(|m| {
                let document = titles.get(m.document_id.as_str());
                let mut metadata = m.metadata;
                if let Some(document) = document {
                    metadata
                        .insert("file_type".to_string(), document.file_type.to_string());
                }
                RetrievedContext {
                    content: m.content,
                    source: document
                        .map(|d| d.title.clone())
                        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
                    similarity: m.similarity,
                    metadata,
                }
            })
            .collect();

        debug!(query_len = query.len(), context_count = contexts.len(), "retrieved context");
        contexts
    }
}

/// Render retrieved contexts as a prompt block.
///
/// Each context becomes a numbered source header with a one-decimal
/// relevance percentage followed by the raw chunk content; blocks are
/// joined by a `---` separator line. An empty list yields the fixed
/// [`NO_CONTEXT_AVAILABLE`] sentinel.
pub fn format_context_for_prompt(contexts: &[RetrievedContext]) -> String {
    if contexts.is_empty() {
        return NO_CONTEXT_AVAILABLE.to_string();
    }

    contexts
        .iter()
        .enumerate()
        .map(|(index, ctx)| {
            format!(
                "\n[Source {}: {} (Relevance: {:.1}%)]\n{}\n",
                index + 1,
                ctx.source,
                f64::from(ctx.similarity) * 100.0,
                ctx.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}
