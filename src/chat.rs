//! The conversation orchestrator.
//!
//! Per request: run intent detection and context retrieval, assemble the
//! system prompt, drive the streaming generation capability with callable
//! tools, and relay the event stream to the caller. Supports cooperative
//! cancellation at any point; partial output under cancellation is not an
//! error.

use std::sync::Arc;

use async_stream::try_stream;
use futures::StreamExt;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ChatConfig;
use crate::error::{Error, Result};
use crate::intent::{IntentDecision, IntentRouter};
use crate::model::{
    last_user_text, ChatEvent, ChatModel, ChatRequest, ChatStream, Message, ToolCall, ToolResult,
    ToolSpec,
};
use crate::retriever::{format_context_for_prompt, ContextRetriever};
use crate::tools::{find_tool, Tool, UPLOAD_RAW_TEXT_TOOL};

/// The top-level request handler for the chat surface.
///
/// Holds only `Arc`'d capabilities, so it is safely shared across
/// concurrent requests.
pub struct ChatOrchestrator {
    config: ChatConfig,
    model: Arc<dyn ChatModel>,
    intent: Arc<IntentRouter>,
    retriever: Arc<ContextRetriever>,
    tools: Vec<Arc<dyn Tool>>,
}

impl ChatOrchestrator {
    /// Create a new [`ChatOrchestratorBuilder`].
    pub fn builder() -> ChatOrchestratorBuilder {
        ChatOrchestratorBuilder::default()
    }

    /// Handle one chat request, returning the event stream to relay.
    ///
    /// The stream yields text deltas token-by-token plus opaque tool-call
    /// and tool-result events. Cancelling `cancel` stops the relay and
    /// drops the underlying generation; no further events are emitted and
    /// no error is raised.
    pub fn chat(&self, messages: Vec<Message>, cancel: CancellationToken) -> ChatStream {
        let config = self.config.clone();
        let model = Arc::clone(&self.model);
        let intent_router = Arc::clone(&self.intent);
        let retriever = Arc::clone(&self.retriever);
        let tools = self.tools.clone();

        let stream = try_stream! {
            let user_text = last_user_text(&messages).unwrap_or("").to_string();

            // Intent detection and retrieval have no ordering dependency.
            let (decision, contexts) = tokio::join!(
                intent_router.detect_intent(&user_text),
                retriever.retrieve(&user_text),
            );
            let context_block = format_context_for_prompt(&contexts);
            info!(
                context_count = contexts.len(),
                should_render = decision.should_render_component,
                "chat request prepared"
            );

            let mut history = messages;

            // Standing exception: a large unstructured paste is ingested
            // immediately rather than trusting the model to ask for it.
            let mut pasted = false;
            if is_unstructured_paste(&user_text, config.paste_min_length) {
                if let Some(upload) = find_tool(&tools, UPLOAD_RAW_TEXT_TOOL) {
                    let call = ToolCall {
                        id: Uuid::new_v4().to_string(),
                        name: upload.name().to_string(),
                        arguments: json!({ "text": user_text }),
                    };
                    yield ChatEvent::ToolCall(call.clone());

                    let payload = match upload.execute(call.arguments.clone()).await {
                        Ok(value) => value,
                        Err(e) => {
                            warn!(error = %e, "raw text upload failed");
                            json!({ "uploaded": false, "error": e.to_string() })
                        }
                    };
                    let result = ToolResult {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        result: payload,
                    };
                    yield ChatEvent::ToolResult(result.clone());
                    history.push(Message::ToolCall(call));
                    history.push(Message::ToolResult(result));
                    pasted = true;
                }
            }

            let system = build_system_prompt(&config, &context_block, &decision, &tools, pasted);
            let tool_specs: Vec<ToolSpec> = tools.iter().map(|t| t.spec()).collect();

            let mut rounds = 0;
            'generation: loop {
                let request = ChatRequest {
                    system: system.clone(),
                    messages: history.clone(),
                    tools: tool_specs.clone(),
                };
                let mut events = model.stream_chat(request).await?;
                let mut pending: Vec<ToolCall> = Vec::new();

                loop {
                    let next = tokio::select! {
                        biased;
                        // Dropping `events` propagates cancellation into
                        // the generation capability.
                        _ = cancel.cancelled() => {
                            debug!("chat stream cancelled");
                            break 'generation;
                        }
                        event = events.next() => event,
                    };
                    let event = match next {
                        Some(event) => event,
                        None => break,
                    };
                    match event? {
                        ChatEvent::TextDelta(delta) => yield ChatEvent::TextDelta(delta),
                        ChatEvent::ToolCall(call) => {
                            yield ChatEvent::ToolCall(call.clone());
                            pending.push(call);
                        }
                        other => yield other,
                    }
                }

                if pending.is_empty() || rounds >= config.max_tool_rounds {
                    break;
                }
                rounds += 1;

                for call in pending {
                    let payload = match find_tool(&tools, &call.name) {
                        Some(tool) => match tool.execute(call.arguments.clone()).await {
                            Ok(value) => value,
                            Err(e) => {
                                warn!(tool = %call.name, error = %e, "tool execution failed");
                                json!({ "error": e.to_string() })
                            }
                        },
                        None => {
                            warn!(tool = %call.name, "model requested unknown tool");
                            json!({ "error": format!("unknown tool '{}'", call.name) })
                        }
                    };
                    let result = ToolResult {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        result: payload,
                    };
                    yield ChatEvent::ToolResult(result.clone());
                    history.push(Message::ToolCall(call));
                    history.push(Message::ToolResult(result));
                }
            }
        };

        Box::pin(stream)
    }
}

/// Heuristic for the large-paste standing exception: long text whose
/// opening carries no actionable instruction.
pub(crate) fn is_unstructured_paste(text: &str, min_length: usize) -> bool {
    if text.len() < min_length {
        return false;
    }
    let head: String = text.chars().take(200).collect::<String>().to_lowercase();
    const INSTRUCTION_MARKERS: [&str; 8] =
        ["?", "please", "show me", "tell me", "can you", "summarize", "explain", "what "];
    !INSTRUCTION_MARKERS.iter().any(|marker| head.contains(marker))
}

fn build_system_prompt(
    config: &ChatConfig,
    context_block: &str,
    decision: &IntentDecision,
    tools: &[Arc<dyn Tool>],
    pasted: bool,
) -> String {
    let tool_manifest = tools
        .iter()
        .map(|t| format!("- {}: {}", t.name(), t.description()))
        .collect::<Vec<_>>()
        .join("\n");

    let confidence = decision.confidence;
    let reasoning = decision.reasoning.as_deref().unwrap_or("(none given)");
    let decision_block = match (&decision.component_name, decision.should_render_component) {
        (Some(component), true) => format!(
            "INTENT DETECTED: The user's question suggests showing the \"{component}\" \
             component (confidence: {confidence}%).\nReasoning: {reasoning}\n\n\
             You should call the appropriate tool AND provide a brief introduction to \
             what they're about to see."
        ),
        _ => format!(
            "INTENT DETECTED: This question is best answered with detailed information \
             from the knowledge base (confidence: {confidence}%).\nReasoning: {reasoning}\n\n\
             Provide a comprehensive, conversational answer using the context above. Do \
             NOT call any tools unless the user explicitly asks to see a timeline, \
             education details, or social links, or you detect a large pasted text that \
             needs uploading."
        ),
    };

    let paste_note = if pasted {
        "\n\nNOTE: The user's pasted text was just ingested into the knowledge base. \
         Briefly confirm the upload and offer to answer questions about it."
    } else {
        ""
    };

    format!(
        "{persona}\n\n\
         KNOWLEDGE BASE CONTEXT:\n{context_block}\n\n\
         AVAILABLE TOOLS:\n{tool_manifest}\n\n\
         DECISION MAKING:\n{decision_block}\n\n\
         RESPONSE GUIDELINES:\n\
         1. Use the knowledge base context to provide accurate, detailed answers\n\
         2. Be conversational and engaging, as if the owner is speaking directly\n\
         3. If calling a tool, explain what the visitor is about to see\n\
         4. If the context doesn't have the answer, be honest and suggest what you can help with\n\
         5. Keep responses concise but informative\n\n\
         Special rule: if a user pastes a large amount of raw text (more than \
         {paste_min} characters or several paragraphs) into the prompt with no clear \
         instruction, call the '{upload_tool}' tool with the provided text to store it \
         in the knowledge base.{paste_note}",
        persona = config.persona,
        paste_min = config.paste_min_length,
        upload_tool = UPLOAD_RAW_TEXT_TOOL,
    )
}

/// Builder for a [`ChatOrchestrator`].
#[derive(Default)]
pub struct ChatOrchestratorBuilder {
    config: Option<ChatConfig>,
    model: Option<Arc<dyn ChatModel>>,
    intent: Option<Arc<IntentRouter>>,
    retriever: Option<Arc<ContextRetriever>>,
    tools: Vec<Arc<dyn Tool>>,
}

impl ChatOrchestratorBuilder {
    /// Set the chat configuration (defaults otherwise).
    pub fn config(mut self, config: ChatConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the streaming generation capability.
    pub fn model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the intent router.
    pub fn intent_router(mut self, intent: Arc<IntentRouter>) -> Self {
        self.intent = Some(intent);
        self
    }

    /// Set the context retriever.
    pub fn retriever(mut self, retriever: Arc<ContextRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Add a callable tool.
    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Build the orchestrator, validating that required capabilities are set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the model, intent router, or
    /// retriever is missing.
    pub fn build(self) -> Result<ChatOrchestrator> {
        let model =
            self.model.ok_or_else(|| Error::InvalidConfig("model is required".to_string()))?;
        let intent = self
            .intent
            .ok_or_else(|| Error::InvalidConfig("intent_router is required".to_string()))?;
        let retriever = self
            .retriever
            .ok_or_else(|| Error::InvalidConfig("retriever is required".to_string()))?;

        Ok(ChatOrchestrator {
            config: self.config.unwrap_or_default(),
            model,
            intent,
            retriever,
            tools: self.tools,
        })
    }
}
