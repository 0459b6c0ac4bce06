//! Fail-soft behavior and source attribution for context retrieval.

use std::collections::HashMap;
use std::sync::Arc;

use chatfolio::chunking::FixedWindowChunker;
use chatfolio::document::{Chunk, Document, FileType};
use chatfolio::inmemory::InMemoryStore;
use chatfolio::mock::{FailingEmbedder, FailingStore, MockEmbedder};
use chatfolio::pipeline::IngestionPipeline;
use chatfolio::retriever::ContextRetriever;
use chatfolio::vectorstore::VectorStore;
use chatfolio::{EmbeddingProvider, RagConfig, Result};
use chrono::Utc;

/// Maps texts to fixed two-dimensional embeddings so similarities are exact.
struct AxisEmbedder;

#[async_trait::async_trait]
impl EmbeddingProvider for AxisEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(if text.contains("work") { vec![1.0, 0.0] } else { vec![0.6, 0.8] })
    }

    fn dimensions(&self) -> usize {
        2
    }
}

fn chunk(id: &str, content: &str, embedding: Vec<f32>) -> Chunk {
    Chunk {
        id: id.to_string(),
        document_id: "d1".to_string(),
        content: content.to_string(),
        embedding,
        metadata: HashMap::new(),
    }
}

fn document(id: &str, title: &str, content: &str) -> Document {
    Document {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        file_type: FileType::Md,
        file_name: format!("{id}.md"),
        file_size: content.len() as u64,
        uploaded_by: "tester".to_string(),
        created_at: Utc::now(),
    }
}

fn pipeline(store: &Arc<InMemoryStore>, embedder: Arc<MockEmbedder>) -> IngestionPipeline {
    IngestionPipeline::builder()
        .chunker(Arc::new(FixedWindowChunker::new(1000, 200).unwrap()))
        .embedder(embedder)
        .vector_store(store.clone())
        .document_store(store.clone())
        .build()
        .unwrap()
}

#[tokio::test]
async fn empty_store_yields_no_context() {
    let store = Arc::new(InMemoryStore::new());
    let retriever = ContextRetriever::new(
        Arc::new(MockEmbedder::default()),
        store.clone(),
        store.clone(),
    );

    assert!(retriever.retrieve("anything").await.is_empty());
}

#[tokio::test]
async fn blank_query_yields_no_context() {
    let store = Arc::new(InMemoryStore::new());
    let retriever = ContextRetriever::new(
        Arc::new(MockEmbedder::default()),
        store.clone(),
        store.clone(),
    );

    assert!(retriever.retrieve("").await.is_empty());
    assert!(retriever.retrieve("   \n").await.is_empty());
}

#[tokio::test]
async fn store_failure_degrades_to_no_context() {
    let failing = Arc::new(FailingStore);
    let retriever = ContextRetriever::new(
        Arc::new(MockEmbedder::default()),
        failing.clone(),
        failing,
    );

    assert!(retriever.retrieve("what is your background?").await.is_empty());
}

#[tokio::test]
async fn embedder_failure_degrades_to_no_context() {
    let store = Arc::new(InMemoryStore::new());
    let retriever =
        ContextRetriever::new(Arc::new(FailingEmbedder), store.clone(), store.clone());

    assert!(retriever.retrieve("what is your background?").await.is_empty());
}

#[tokio::test]
async fn ingested_content_comes_back_attributed() {
    let store = Arc::new(InMemoryStore::new());
    let embedder = Arc::new(MockEmbedder::default());
    let pipeline = pipeline(&store, embedder.clone());

    let doc = document("d1", "Career notes", "Led the storage team for four years.");
    pipeline.ingest_document(&doc).await.unwrap();

    let retriever = ContextRetriever::new(embedder, store.clone(), store.clone());
    let contexts = retriever.retrieve("Led the storage team for four years.").await;

    assert_eq!(contexts.len(), 1);
    assert_eq!(contexts[0].source, "Career notes");
    assert!(contexts[0].similarity > 0.99);
    assert_eq!(contexts[0].metadata.get("file_type").map(String::as_str), Some("md"));
    assert_eq!(contexts[0].metadata.get("chunk_index").map(String::as_str), Some("0"));
}

#[tokio::test]
async fn dangling_chunk_reports_unknown_source() {
    let store = Arc::new(InMemoryStore::new());
    let embedder = MockEmbedder::default();

    // A chunk whose document was never stored
    let embedding = embedder.embed("orphaned content").await.unwrap();
    store
        .insert(&[Chunk {
            id: "c1".to_string(),
            document_id: "gone".to_string(),
            content: "orphaned content".to_string(),
            embedding,
            metadata: HashMap::new(),
        }])
        .await
        .unwrap();

    let retriever =
        ContextRetriever::new(Arc::new(embedder), store.clone(), store.clone());
    let contexts = retriever.retrieve("orphaned content").await;

    assert_eq!(contexts.len(), 1);
    assert_eq!(contexts[0].source, "Unknown");
    assert!(!contexts[0].metadata.contains_key("file_type"));
}

#[tokio::test]
async fn matches_below_the_similarity_threshold_are_dropped() {
    let store = Arc::new(InMemoryStore::new());
    // Query "work…" embeds to [1, 0]: exact match scores 1.0, the off-axis
    // chunk scores 0.6
    store
        .insert(&[
            chunk("c1", "work history", vec![1.0, 0.0]),
            chunk("c2", "hobby notes", vec![0.6, 0.8]),
        ])
        .await
        .unwrap();

    let config = RagConfig::builder().similarity_threshold(0.7).build().unwrap();
    let retriever = ContextRetriever::new(Arc::new(AxisEmbedder), store.clone(), store.clone())
        .with_config(config);

    let contexts = retriever.retrieve("work history").await;

    assert_eq!(contexts.len(), 1);
    assert_eq!(contexts[0].content, "work history");
    assert!((contexts[0].similarity - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn top_k_bounds_the_result_count() {
    let store = Arc::new(InMemoryStore::new());
    store
        .insert(&[
            chunk("c1", "work history", vec![1.0, 0.0]),
            chunk("c2", "hobby notes", vec![0.6, 0.8]),
        ])
        .await
        .unwrap();

    let config = RagConfig::builder().top_k(1).build().unwrap();
    let retriever = ContextRetriever::new(Arc::new(AxisEmbedder), store.clone(), store.clone())
        .with_config(config);

    let contexts = retriever.retrieve("work history").await;

    assert_eq!(contexts.len(), 1);
    assert_eq!(contexts[0].content, "work history");
}
