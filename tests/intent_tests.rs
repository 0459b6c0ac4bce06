//! Intent detection degradation paths and registry validation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chatfolio::inmemory::InMemoryStore;
use chatfolio::intent::{IntentDecision, IntentRouter};
use chatfolio::mock::MockStructuredGenerator;
use chatfolio::model::StructuredGenerator;
use chatfolio::registry::ComponentDescriptor;
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

async fn registry_with_timeline() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store
        .register_component(ComponentDescriptor {
            name: "work-timeline".to_string(),
            display_name: "Work Timeline".to_string(),
            description: "Interactive career history".to_string(),
            intent: vec!["work".to_string(), "career".to_string()],
            component_path: "components/work-timeline".to_string(),
            priority: 10,
            is_active: true,
        })
        .await;
    store
}

#[tokio::test]
async fn empty_registry_skips_the_generator() {
    let store = Arc::new(InMemoryStore::new());
    let generator = Arc::new(MockStructuredGenerator::new(vec![json!({
        "shouldRenderComponent": true,
        "componentName": "work-timeline",
        "confidence": 95,
        "reasoning": "should never be consulted"
    })]));
    let router = IntentRouter::new(store, generator.clone());

    let decision = router.detect_intent("show me your work history").await;

    assert_eq!(decision, IntentDecision::none());
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn known_component_is_matched_and_resolved() {
    let store = registry_with_timeline().await;
    let generator = Arc::new(MockStructuredGenerator::new(vec![json!({
        "shouldRenderComponent": true,
        "componentName": "work-timeline",
        "confidence": 87.6,
        "reasoning": "direct question about work history"
    })]));
    let router = IntentRouter::new(store, generator);

    let decision = router.detect_intent("show me your work history").await;

    assert!(decision.should_render_component);
    assert_eq!(decision.component_name.as_deref(), Some("work-timeline"));
    assert_eq!(decision.component_path.as_deref(), Some("components/work-timeline"));
    assert_eq!(decision.confidence, 88);
    assert_eq!(decision.reasoning.as_deref(), Some("direct question about work history"));
}

#[tokio::test]
async fn hallucinated_component_name_is_not_trusted() {
    let store = registry_with_timeline().await;
    let generator = Arc::new(MockStructuredGenerator::new(vec![json!({
        "shouldRenderComponent": true,
        "componentName": "salary-breakdown",
        "confidence": 99,
        "reasoning": "made up"
    })]));
    let router = IntentRouter::new(store, generator);

    let decision = router.detect_intent("how much do you earn?").await;

    assert_eq!(decision.component_name, None);
    assert_eq!(decision.component_path, None);
}

#[tokio::test]
async fn generator_failure_degrades_to_default() {
    let store = registry_with_timeline().await;
    let router = IntentRouter::new(store, Arc::new(MockStructuredGenerator::failing()));

    let decision = router.detect_intent("show me your work history").await;

    assert_eq!(decision, IntentDecision::none());
}

#[tokio::test]
async fn malformed_decision_degrades_to_default() {
    let store = registry_with_timeline().await;
    let generator =
        Arc::new(MockStructuredGenerator::new(vec![json!("not an object at all")]));
    let router = IntentRouter::new(store, generator);

    let decision = router.detect_intent("show me your work history").await;

    assert_eq!(decision, IntentDecision::none());
}

#[tokio::test]
async fn slow_generator_hits_the_deadline() {
    let store = registry_with_timeline().await;
    let router = IntentRouter::new(store, Arc::new(PendingGenerator))
        .with_timeout(Duration::from_millis(20));

    let decision = router.detect_intent("show me your work history").await;

    assert_eq!(decision, IntentDecision::none());
}
