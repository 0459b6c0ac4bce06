//! Suggestion engine caching and degraded paths.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chatfolio::cache::{InMemoryTtlCache, NoopCache};
use chatfolio::mock::MockStructuredGenerator;
use chatfolio::model::StructuredGenerator;
use chatfolio::suggestions::{SuggestionEngine, DEFAULT_SUGGESTIONS};
use chatfolio::Result;
use serde_json::{json, Value};

/// A generator that never resolves, for exercising the deadline path.
struct PendingGenerator;

#[async_trait]
impl StructuredGenerator for PendingGenerator {
    async fn generate_json(&self, _system: &str, _prompt: &str, _schema: &Value) -> Result<Value> {
        std::future::pending().await
    }
}

fn four_suggestions() -> Value {
    json!({
        "suggestions": [
            "What did you build at your last job?",
            "Tell me about your education",
            "What are your hobbies?",
            "How can I reach you?"
        ]
    })
}

#[tokio::test]
async fn generated_suggestions_are_cached() {
    let generator = Arc::new(MockStructuredGenerator::new(vec![four_suggestions()]));
    let engine = SuggestionEngine::new(generator.clone(), Arc::new(InMemoryTtlCache::default()));

    let history = vec!["tell me about your work".to_string()];
    let first = engine.suggest(&history).await;
    assert_eq!(first.len(), 4);
    assert_eq!(first[0], "What did you build at your last job?");

    // Same history fingerprint: served from cache, generator untouched
    let second = engine.suggest(&history).await;
    assert_eq!(second, first);
    assert_eq!(generator.call_count(), 1);
}

#[tokio::test]
async fn generator_failure_falls_back_by_topic() {
    let engine = SuggestionEngine::new(
        Arc::new(MockStructuredGenerator::failing()),
        Arc::new(NoopCache),
    );

    let history = vec!["what was your first job like?".to_string()];
    let suggestions = engine.suggest(&history).await;

    assert_eq!(suggestions.len(), 4);
    assert!(suggestions.iter().any(|s| s.contains("education")));
}

#[tokio::test]
async fn empty_history_gets_the_defaults() {
    let engine = SuggestionEngine::new(
        Arc::new(MockStructuredGenerator::failing()),
        Arc::new(NoopCache),
    );

    let suggestions = engine.suggest(&[]).await;

    assert_eq!(suggestions, DEFAULT_SUGGESTIONS.map(String::from).to_vec());
}

#[tokio::test]
async fn slow_generation_hits_the_deadline() {
    let engine = SuggestionEngine::new(Arc::new(PendingGenerator), Arc::new(NoopCache))
        .with_timeout(Duration::from_millis(20));

    let suggestions = engine.suggest(&["anything".to_string()]).await;

    assert_eq!(suggestions, DEFAULT_SUGGESTIONS.map(String::from).to_vec());
}
