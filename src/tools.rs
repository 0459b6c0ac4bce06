//! Callable tools exposed to the generation capability.
//!
//! Tools return small confirmation objects; the caller (UI layer) decides
//! what to render. Tool names are the camelCase identifiers the client and
//! the model both see.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::error::{Error, Result};
use crate::model::ToolSpec;
use crate::pipeline::IngestionPipeline;

/// Name of the raw-text upload tool, referenced by the orchestrator's
/// large-paste handling.
pub const UPLOAD_RAW_TEXT_TOOL: &str = "uploadRawTextToRag";

/// A capability callable by the generation model.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool name as exposed to the model.
    fn name(&self) -> &str;

    /// What the tool does, for the model's benefit.
    fn description(&self) -> &str;

    /// JSON schema for the tool's arguments.
    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    /// Execute the tool with the given arguments.
    async fn execute(&self, args: Value) -> Result<Value>;

    /// The [`ToolSpec`] advertised to the model.
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Displays the owner's work experience timeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShowWorkTimeline;

#[async_trait]
impl Tool for ShowWorkTimeline {
    fn name(&self) -> &str {
        "showWorkTimeline"
    }

    fn description(&self) -> &str {
        "Display the work experience timeline with interactive career history"
    }

    async fn execute(&self, _args: Value) -> Result<Value> {
        info!("showing work timeline");
        Ok(json!({ "displayed": true, "component": "work-timeline" }))
    }
}

/// Displays the owner's educational background.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShowEducation;

#[async_trait]
impl Tool for ShowEducation {
    fn name(&self) -> &str {
        "showEducation"
    }

    fn description(&self) -> &str {
        "Display the educational background with undergraduate and graduate details"
    }

    async fn execute(&self, _args: Value) -> Result<Value> {
        info!("showing education");
        Ok(json!({ "displayed": true, "component": "education-selector" }))
    }
}

/// Displays personal interests and social media links.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShowPersonalPassions;

#[async_trait]
impl Tool for ShowPersonalPassions {
    fn name(&self) -> &str {
        "showPersonalPassions"
    }

    fn description(&self) -> &str {
        "Display personal interests and social media connections"
    }

    async fn execute(&self, _args: Value) -> Result<Value> {
        info!("showing personal passions");
        Ok(json!({ "displayed": true, "component": "social-links" }))
    }
}

/// Uploads pasted raw text into the knowledge base.
///
/// Used when a visitor pastes a long block of text into the prompt without
/// instructions. Wraps [`IngestionPipeline::capture_pasted_text`].
pub struct UploadRawTextToRag {
    pipeline: Arc<IngestionPipeline>,
    min_length: usize,
}

impl UploadRawTextToRag {
    /// Create the tool with the default 1000-character minimum.
    pub fn new(pipeline: Arc<IngestionPipeline>) -> Self {
        Self { pipeline, min_length: 1000 }
    }

    /// Override the minimum accepted text length.
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }
}

#[async_trait]
impl Tool for UploadRawTextToRag {
    fn name(&self) -> &str {
        UPLOAD_RAW_TEXT_TOOL
    }

    fn description(&self) -> &str {
        "Uploads pasted raw text (such as long documents or data) to the knowledge base \
         for retrieval-augmented generation. Use when a user pastes a long block of text \
         into the prompt without instructions."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "minLength": self.min_length,
                    "description": "The raw text to store in the knowledge base"
                }
            },
            "required": ["text"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let text = args
            .get("text")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::Tool("missing required 'text' parameter".to_string()))?;

        if text.len() < self.min_length {
            return Err(Error::Tool(format!(
                "text must be at least {} characters for upload",
                self.min_length
            )));
        }

        info!(text_len = text.len(), "uploading raw text to knowledge base");
        let document = self.pipeline.capture_pasted_text(text).await?;

        Ok(json!({ "uploaded": true, "documentId": document.id }))
    }
}

/// Find a tool by name in a tool set.
pub(crate) fn find_tool<'a>(tools: &'a [Arc<dyn Tool>], name: &str) -> Option<&'a Arc<dyn Tool>> {
    tools.iter().find(|t| t.name() == name)
}
