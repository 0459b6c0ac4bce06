//! Intent detection: choose between a UI component and a text answer.
//!
//! [`IntentRouter`] builds a manifest of active [`ComponentDescriptor`]s and
//! asks a structured-generation capability for a typed decision. The
//! model-named component is always validated against the registry; a name
//! the registry does not know is treated as "no match", never trusted.
//! Every failure degrades to the default no-component decision.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::StructuredGenerator;
use crate::registry::{ComponentDescriptor, ComponentRegistry};

/// Default deadline for the structured decision call.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A typed intent decision. Ephemeral; produced per message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntentDecision {
    /// Whether a component should be rendered instead of a plain answer.
    pub should_render_component: bool,
    /// The validated component name, if one matched the registry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_name: Option<String>,
    /// The matched component's render path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_path: Option<String>,
    /// Model confidence, 0–100.
    pub confidence: u8,
    /// The model's stated reasoning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl IntentDecision {
    /// The default decision: answer from retrieved context, no component.
    pub fn none() -> Self {
        Self {
            should_render_component: false,
            component_name: None,
            component_path: None,
            confidence: 0,
            reasoning: None,
        }
    }
}

/// Raw decision shape produced by the generation capability.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawDecision {
    should_render_component: bool,
    component_name: Option<String>,
    confidence: f64,
    reasoning: Option<String>,
}

impl Default for RawDecision {
    fn default() -> Self {
        Self {
            should_render_component: false,
            component_name: None,
            confidence: 0.0,
            reasoning: None,
        }
    }
}

/// Routes user messages to a UI component or the RAG answer path.
pub struct IntentRouter {
    registry: Arc<dyn ComponentRegistry>,
    generator: Arc<dyn StructuredGenerator>,
    timeout: Duration,
}

impl IntentRouter {
    /// Create a new router over the given registry and generator.
    pub fn new(
        registry: Arc<dyn ComponentRegistry>,
        generator: Arc<dyn StructuredGenerator>,
    ) -> Self {
        Self { registry, generator, timeout: DEFAULT_TIMEOUT }
    }

    /// Override the decision-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Detect the intent of a user message.
    ///
    /// Never fails: registry errors, capability errors, timeouts, and
    /// malformed decisions all degrade to [`IntentDecision::none`]. With no
    /// active components registered, returns immediately without calling
    /// the generation capability.
    pub async fn detect_intent(&self, message: &str) -> IntentDecision {
        match self.try_detect(message).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!(error = %e, "intent detection failed; using default decision");
                IntentDecision::none()
            }
        }
    }

    async fn try_detect(&self, message: &str) -> Result<IntentDecision> {
        let components = self.registry.active_components().await?;
        if components.is_empty() {
            debug!("no active components; skipping intent detection");
            return Ok(IntentDecision::none());
        }

        let system = build_system_prompt(&components);
        let prompt =
            format!("User message: \"{message}\"\n\nShould this trigger a component or use RAG?");
        let schema = decision_schema();

        let value = timeout(self.timeout, self.generator.generate_json(&system, &prompt, &schema))
            .await
            .map_err(|_| Error::Model("intent decision timed out".to_string()))??;

        let raw: RawDecision = serde_json::from_value(value)
            .map_err(|e| Error::Model(format!("malformed intent decision: {e}")))?;

        // Only trust component names the registry actually knows
        let matched = raw
            .component_name
            .as_deref()
            .and_then(|name| components.iter().find(|c| c.name == name));

        let decision = IntentDecision {
            should_render_component: raw.should_render_component,
            component_name: matched.map(|c| c.name.clone()),
            component_path: matched.map(|c| c.component_path.clone()),
            confidence: raw.confidence.round().clamp(0.0, 100.0) as u8,
            reasoning: raw.reasoning,
        };
        debug!(
            should_render = decision.should_render_component,
            component = decision.component_name.as_deref().unwrap_or("-"),
            confidence = decision.confidence,
            "intent detected"
        );
        Ok(decision)
    }
}

fn build_system_prompt(components: &[ComponentDescriptor]) -> String {
    let manifest = components
        .iter()
        .map(|c| {
            format!(
                "Component: {}\nDisplay Name: {}\nDescription: {}\nTriggers: {}\n",
                c.name,
                c.display_name,
                c.description,
                c.intent.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an intent detection system for an interactive resume.\n\n\
         Your job is to determine if the user's message should trigger a custom \
         interactive component or be answered with a text response using the \
         knowledge base.\n\n\
         Available components:\n{manifest}\n\
         Analyze the user's message and determine:\n\
         1. Should a component be rendered? (true/false)\n\
         2. If yes, which component is most appropriate?\n\
         3. How confident are you? (0-100)\n\
         4. Brief reasoning for your decision\n\n\
         Guidelines:\n\
         - Render components for direct questions about work, education, or social connections\n\
         - Use the knowledge base for specific questions, follow-ups, or detailed inquiries\n\
         - Be conservative: when in doubt, prefer the knowledge base for a more personalized answer"
    )
}

fn decision_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "shouldRenderComponent": { "type": "boolean" },
            "componentName": { "type": "string" },
            "confidence": { "type": "number", "minimum": 0, "maximum": 100 },
            "reasoning": { "type": "string" }
        },
        "required": ["shouldRenderComponent", "confidence", "reasoning"]
    })
}
