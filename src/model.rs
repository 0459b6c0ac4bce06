//! Generation capability seams: messages, stream events, and the model traits.
//!
//! The streaming and structured-generation wire protocols are external
//! concerns; the core talks to them through [`ChatModel`] and
//! [`StructuredGenerator`]. Messages are a tagged variant rather than a
//! duck-typed role/content bag, with explicit extraction helpers.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// The author of a text message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// The visitor.
    User,
    /// The model.
    Assistant,
}

/// A request from the model to invoke a named tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Correlation ID pairing this call with its result.
    pub id: String,
    /// The tool name.
    pub name: String,
    /// JSON arguments for the tool.
    pub arguments: Value,
}

/// The result of an executed tool call, relayed opaquely to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    /// The originating call's correlation ID.
    pub id: String,
    /// The tool name.
    pub name: String,
    /// The tool's confirmation payload.
    pub result: Value,
}

/// One entry in a conversation history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Plain text from a [`Role`].
    Text {
        /// The author.
        role: Role,
        /// The message text.
        content: String,
    },
    /// A tool invocation issued by the model.
    ToolCall(ToolCall),
    /// The result returned for a tool invocation.
    ToolResult(ToolResult),
}

impl Message {
    /// Build a user text message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::Text { role: Role::User, content: content.into() }
    }

    /// Build an assistant text message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Text { role: Role::Assistant, content: content.into() }
    }

    /// The text content, if this is a text message.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    /// The role, if this is a text message.
    pub fn role(&self) -> Option<Role> {
        match self {
            Self::Text { role, .. } => Some(*role),
            _ => None,
        }
    }
}

/// The text of the most recent user message in a history, if any.
pub fn last_user_text(messages: &[Message]) -> Option<&str> {
    messages.iter().rev().find_map(|m| match m {
        Message::Text { role: Role::User, content } => Some(content.as_str()),
        _ => None,
    })
}

/// A tool made visible to the generation capability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSpec {
    /// The tool name.
    pub name: String,
    /// What the tool does, for the model's benefit.
    pub description: String,
    /// JSON schema for the tool's arguments.
    pub parameters: Value,
}

/// A streaming generation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    /// The assembled system prompt.
    pub system: String,
    /// Conversation history, oldest first.
    pub messages: Vec<Message>,
    /// Tools the model may call.
    pub tools: Vec<ToolSpec>,
}

/// One item in a chat event stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A text token (or token run) to relay to the client.
    TextDelta(String),
    /// The model requested a tool invocation.
    ToolCall(ToolCall),
    /// A tool finished; the payload is for the caller to render.
    ToolResult(ToolResult),
}

/// A boxed stream of chat events.
pub type ChatStream = BoxStream<'static, Result<ChatEvent>>;

/// A streaming text-generation capability with tool support.
///
/// Dropping the returned stream cancels the underlying generation; the
/// orchestrator relies on this for mid-stream aborts.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// The model identifier, for logging.
    fn name(&self) -> &str;

    /// Start a streaming generation.
    async fn stream_chat(&self, request: ChatRequest) -> Result<ChatStream>;
}

/// A structured-object generation capability.
///
/// Returns a JSON value matching the supplied schema. Callers own the
/// timeout: wrap the call in `tokio::time::timeout` rather than racing
/// detached tasks.
#[async_trait]
pub trait StructuredGenerator: Send + Sync {
    /// Generate a JSON object matching `schema`.
    async fn generate_json(&self, system: &str, prompt: &str, schema: &Value) -> Result<Value>;
}
