//! Configuration for retrieval and conversation behavior.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for chunking and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters.
    pub chunk_overlap: usize,
    /// Number of contexts retrieved per query.
    pub top_k: usize,
    /// Minimum similarity for retrieved contexts (below is dropped).
    pub similarity_threshold: f32,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self { chunk_size: 1000, chunk_overlap: 200, top_k: 5, similarity_threshold: 0.0 }
    }
}

impl RagConfig {
    /// Create a new builder.
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of contexts retrieved per query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the minimum similarity for retrieved contexts.
    pub fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.config.similarity_threshold = threshold;
        self
    }

    /// Build the config, validating consistency.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `chunk_overlap` is zero or not
    /// less than `chunk_size`, or if `top_k` is zero.
    pub fn build(self) -> Result<RagConfig> {
        if self.config.chunk_overlap == 0 || self.config.chunk_overlap >= self.config.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunk_overlap ({}) must be greater than zero and less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(Error::InvalidConfig("top_k must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}

/// Configuration for the conversation orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatConfig {
    /// Persona instructions placed at the top of every system prompt.
    pub persona: String,
    /// Minimum length for a message to count as a raw paste.
    pub paste_min_length: usize,
    /// Maximum tool-call round trips per request.
    pub max_tool_rounds: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            persona: DEFAULT_PERSONA.to_string(),
            paste_min_length: 1000,
            max_tool_rounds: 4,
        }
    }
}

/// Default persona for the interactive resume assistant.
pub const DEFAULT_PERSONA: &str = "You are the AI assistant for an interactive resume. \
Help visitors learn about the site owner through natural conversation. You have access \
to tools that display interactive views AND a knowledge base with detailed background \
information. If a question is inappropriate or unrelated to the owner's experience, \
politely decline and suggest a more suitable question. Be conversational, concise, \
and professional.";
