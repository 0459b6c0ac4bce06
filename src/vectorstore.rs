//! Persistence traits: vector search over chunks and document lookup.

use async_trait::async_trait;

use crate::document::{Chunk, ChunkMatch, Document};
use crate::error::Result;

/// A storage backend for chunk embeddings with similarity search.
///
/// Inserts are append-only and reads are similarity queries, so backends
/// need no global lock to tolerate concurrent ingestion and search.
///
/// # Example
///
/// ```rust,ignore
/// use chatfolio::{InMemoryStore, VectorStore};
///
/// let store = InMemoryStore::new();
/// store.insert(&chunks).await?;
/// let matches = store.search(&query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert a batch of chunks. Chunks must have embeddings set.
    ///
    /// The batch lands atomically: a failed insert leaves none of the
    /// given chunks behind.
    async fn insert(&self, chunks: &[Chunk]) -> Result<()>;

    /// Return the `limit` chunks most similar to the given embedding,
    /// ordered by descending similarity.
    async fn search(&self, embedding: &[f32], limit: usize) -> Result<Vec<ChunkMatch>>;
}

/// Storage for [`Document`] records.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a new document record.
    async fn insert_document(&self, document: &Document) -> Result<()>;

    /// Fetch documents by ID. Missing IDs are silently skipped; dangling
    /// chunk references must not fail the retrieval path.
    async fn fetch_documents(&self, ids: &[String]) -> Result<Vec<Document>>;
}
