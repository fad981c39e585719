use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use coursebot_tools::{ToolCall, ToolDefinition, ToolResult};

/// One block of model output.
/// Provider-agnostic — translated from the wire format in the provider layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ContentBlock {
    /// A chunk of assistant text
    Text { text: String },
    /// The model wants a tool executed
    ToolUse { id: String, name: String, input: Value },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// Normal end of response
    EndTurn,
    /// Model wants to use tools
    ToolUse,
    /// Hit max tokens limit
    MaxTokens,
    /// Stopped by stop sequence
    StopSequence,
}

/// A complete (non-streaming) model response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    pub stop_reason: StopReason,
    pub content: Vec<ContentBlock>,
}

impl ModelResponse {
    /// Text of the first text block, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Requested tool calls, in the order their blocks appear.
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => Some(ToolCall {
                    id: id.clone(),
                    name: name.clone(),
                    input: input.clone(),
                }),
                _ => None,
            })
            .collect()
    }
}

/// A message in the model-visible conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChatMessage {
    /// User's text input
    User(String),
    /// Assistant content, preserved verbatim including tool_use blocks
    Assistant(Vec<ContentBlock>),
    /// Results of one tool round, in request order
    ToolResults(Vec<ToolResult>),
}

/// Trait for model backends.
///
/// Lives with the orchestrator (the consumer), not the provider;
/// implementations live in [`crate::providers`].
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Send one messages request and return the complete response.
    /// When `tools` is non-empty the provider attaches them with an
    /// "auto" tool-choice policy.
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        system: &str,
        tools: &[ToolDefinition],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<ModelResponse, LlmError>;

    /// Provider name for logging/debugging (e.g., "claude")
    fn provider_name(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} — {body}")]
    Api { status: u16, body: String },
    #[error("Authentication failed")]
    Auth,
    #[error("failed to parse response: {0}")]
    Parse(String),
}

/// Mock model provider for exercising the orchestrator without API calls.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// A request as the mock saw it, for asserting on call structure.
    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub messages: Vec<ChatMessage>,
        pub system: String,
        pub tool_count: usize,
        pub temperature: f32,
        pub max_tokens: u32,
    }

    /// Returns queued responses in FIFO order and records every request.
    pub struct MockProvider {
        responses: Mutex<VecDeque<ModelResponse>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl MockProvider {
        pub fn new() -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Queue a response for the next call.
        pub fn queue_response(&self, response: ModelResponse) {
            self.responses.lock().unwrap().push_back(response);
        }

        /// Queue a plain text response.
        pub fn queue_text(&self, text: &str) {
            self.queue_response(ModelResponse {
                stop_reason: StopReason::EndTurn,
                content: vec![ContentBlock::Text {
                    text: text.to_string(),
                }],
            });
        }

        pub fn recorded_calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Default for MockProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ModelProvider for MockProvider {
        async fn complete(
            &self,
            messages: Vec<ChatMessage>,
            system: &str,
            tools: &[ToolDefinition],
            temperature: f32,
            max_tokens: u32,
        ) -> Result<ModelResponse, LlmError> {
            self.calls.lock().unwrap().push(RecordedCall {
                messages,
                system: system.to_string(),
                tool_count: tools.len(),
                temperature,
                max_tokens,
            });
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(ModelResponse {
                    stop_reason: StopReason::EndTurn,
                    content: Vec::new(),
                }))
        }

        fn provider_name(&self) -> &str {
            "mock"
        }
    }
}
