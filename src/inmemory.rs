//! In-memory backing store using cosine similarity.
//!
//! [`InMemoryStore`] implements [`VectorStore`], [`DocumentStore`], and
//! [`ComponentRegistry`] over `HashMap`s protected by `tokio::sync::RwLock`.
//! Suitable for development, testing, and small deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Chunk, ChunkMatch, Document};
use crate::error::Result;
use crate::registry::{ComponentDescriptor, ComponentRegistry};
use crate::vectorstore::{DocumentStore, VectorStore};

/// A process-local store for chunks, documents, and component descriptors.
///
/// All operations are async-safe via `tokio::sync::RwLock`; chunk inserts
/// land under a single write lock, so a batch is all-or-nothing.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    chunks: RwLock<HashMap<String, Chunk>>,
    documents: RwLock<HashMap<String, Document>>,
    components: RwLock<Vec<ComponentDescriptor>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component descriptor (test/admin seam).
    pub async fn register_component(&self, descriptor: ComponentDescriptor) {
        let mut components = self.components.write().await;
        components.retain(|c| c.name != descriptor.name);
        components.push(descriptor);
    }

    /// Number of stored chunks.
    pub async fn chunk_count(&self) -> usize {
        self.chunks.read().await.len()
    }

    /// Number of stored documents.
    pub async fn document_count(&self) -> usize {
        self.documents.read().await.len()
    }
}

/// Cosine similarity clamped into `[0, 1]`.
///
/// Negative correlation carries no retrieval value, so scores below zero
/// flatten to zero, keeping similarity aligned with the `1 - cosine
/// distance` contract. Zero-magnitude vectors score 0.0.
fn similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn insert(&self, chunks: &[Chunk]) -> Result<()> {
        let mut store = self.chunks.write().await;
        for chunk in chunks {
            store.insert(chunk.id.clone(), chunk.clone());
        }
        Ok(())
    }

    async fn search(&self, embedding: &[f32], limit: usize) -> Result<Vec<ChunkMatch>> {
        let store = self.chunks.read().await;

        let mut scored: Vec<ChunkMatch> = store
            .values()
            .map(|chunk| ChunkMatch {
                chunk_id: chunk.id.clone(),
                document_id: chunk.document_id.clone(),
                content: chunk.content.clone(),
                metadata: chunk.metadata.clone(),
                similarity: similarity(&chunk.embedding, embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);
        Ok(scored)
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn insert_document(&self, document: &Document) -> Result<()> {
        let mut documents = self.documents.write().await;
        documents.insert(document.id.clone(), document.clone());
        Ok(())
    }

    async fn fetch_documents(&self, ids: &[String]) -> Result<Vec<Document>> {
        let documents = self.documents.read().await;
        Ok(ids.iter().filter_map(|id| documents.get(id).cloned()).collect())
    }
}

#[async_trait]
impl ComponentRegistry for InMemoryStore {
    async fn active_components(&self) -> Result<Vec<ComponentDescriptor>> {
        let components = self.components.read().await;
        let mut active: Vec<ComponentDescriptor> =
            components.iter().filter(|c| c.is_active).cloned().collect();
        active.sort_by(|a, b| b.priority.cmp(&a.priority));
        Ok(active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn similarity_is_clamped() {
        assert_eq!(similarity(&[1.0, 0.0], &[-1.0, 0.0]), 0.0);
        assert!((similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert_eq!(similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
