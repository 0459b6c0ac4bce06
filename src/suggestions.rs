//! Contextual follow-up prompt suggestions.
//!
//! [`SuggestionEngine`] asks the structured-generation capability for four
//! follow-up prompts based on recent history, under a hard deadline
//! expressed as a timeout on the call itself. Results are cached by a
//! fingerprint of the three most recent history entries. Any failure falls
//! back to keyword-matched canned suggestions; this path never errors.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::cache::SuggestionCache;
use crate::model::StructuredGenerator;

/// Default deadline for the suggestion call.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Suggestions shown before any history exists, and as the last-resort
/// fallback.
pub const DEFAULT_SUGGESTIONS: [&str; 4] = [
    "Tell me about your work experience",
    "What's your educational background?",
    "What are your personal interests?",
    "How can I connect with you?",
];

const WORK_FALLBACKS: [&str; 4] = [
    "What about your education?",
    "Tell me about your personal interests",
    "Show me your career highlights",
    "What projects have you worked on?",
];

const EDUCATION_FALLBACKS: [&str; 4] = [
    "Tell me about your work experience",
    "What are your research interests?",
    "Show me your career timeline",
    "What skills have you developed?",
];

const PERSONAL_FALLBACKS: [&str; 4] = [
    "What's your professional background?",
    "Tell me about your education",
    "Show me your work timeline",
    "How can I reach out to you?",
];

#[derive(Debug, Deserialize)]
struct SuggestionSet {
    suggestions: Vec<String>,
}

/// Generates follow-up prompt suggestions from conversation history.
pub struct SuggestionEngine {
    generator: Arc<dyn StructuredGenerator>,
    cache: Arc<dyn SuggestionCache>,
    timeout: Duration,
}

impl SuggestionEngine {
    /// Create a new engine over the given generator and cache.
    pub fn new(generator: Arc<dyn StructuredGenerator>, cache: Arc<dyn SuggestionCache>) -> Self {
        Self { generator, cache, timeout: DEFAULT_TIMEOUT }
    }

    /// Override the suggestion-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Suggest four follow-up prompts for the given history (most recent
    /// first). Never fails; degraded paths return canned suggestions.
    pub async fn suggest(&self, history: &[String]) -> Vec<String> {
        let fingerprint = history.iter().take(3).cloned().collect::<Vec<_>>();
        let cache_key = serde_json::to_string(&fingerprint).unwrap_or_default();

        if let Some(cached) = self.cache.get(&cache_key).await {
            debug!("suggestion cache hit");
            return cached;
        }

        let generated = timeout(self.timeout, self.generate(history)).await;
        match generated {
            Ok(Some(suggestions)) => {
                self.cache.put(&cache_key, suggestions.clone()).await;
                suggestions
            }
            Ok(None) => contextual_fallback(history),
            Err(_) => {
                warn!("suggestion generation timed out; using fallback");
                contextual_fallback(history)
            }
        }
    }

    async fn generate(&self, history: &[String]) -> Option<Vec<String>> {
        let system = "You are an AI assistant generating smart prompt suggestions for an \
            interactive resume website.\n\n\
            The website lets visitors explore the owner's work experience and career \
            timeline, educational background, and personal interests and social media \
            connections.\n\n\
            Based on the user's recent conversation history, suggest 4 relevant follow-up \
            prompts that:\n\
            1. Build naturally on what they've already asked about\n\
            2. Encourage deeper exploration of the owner's background\n\
            3. Are conversational and engaging (not robotic)\n\
            4. Guide them to discover aspects they haven't explored yet\n\
            5. Are concise (max 8-10 words each)\n\n\
            If they've asked about work, suggest education or personal interests. If \
            they've asked about education, suggest work experience or how to connect.";

        let history_block = if history.is_empty() {
            "No history yet - this is the user's first visit".to_string()
        } else {
            history
                .iter()
                .enumerate()
                .map(|(i, h)| format!("{}. \"{h}\"", i + 1))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let prompt = format!(
            "Recent conversation history (most recent first):\n{history_block}\n\n\
             Generate 4 smart, contextual follow-up prompts that feel natural and \
             encourage exploration."
        );

        let schema = json!({
            "type": "object",
            "properties": {
                "suggestions": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": 4,
                    "maxItems": 4,
                    "description": "Four suggested follow-up prompts"
                }
            },
            "required": ["suggestions"]
        });

        let value = match self.generator.generate_json(system, &prompt, &schema).await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "suggestion generation failed; using fallback");
                return None;
            }
        };

        match serde_json::from_value::<SuggestionSet>(value) {
            Ok(set) if !set.suggestions.is_empty() => Some(set.suggestions),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "malformed suggestion payload; using fallback");
                None
            }
        }
    }
}

/// Keyword-matched canned suggestions for a degraded generation path.
fn contextual_fallback(history: &[String]) -> Vec<String> {
    let Some(recent) = history.first() else {
        return DEFAULT_SUGGESTIONS.iter().map(|s| s.to_string()).collect();
    };
    let recent = recent.to_lowercase();

    let set: &[&str; 4] = if ["work", "career", "job"].iter().any(|k| recent.contains(k)) {
        &WORK_FALLBACKS
    } else if ["education", "school", "university"].iter().any(|k| recent.contains(k)) {
        &EDUCATION_FALLBACKS
    } else if ["interest", "hobby", "social"].iter().any(|k| recent.contains(k)) {
        &PERSONAL_FALLBACKS
    } else {
        &DEFAULT_SUGGESTIONS
    };
    set.iter().map(|s| s.to_string()).collect()
}
