//! Generation orchestrator.
//!
//! Drives the model call, detects a tool-invocation response, dispatches the
//! requested tools through a [`ToolExecutor`], and issues exactly one
//! follow-up call to produce the final answer.

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use coursebot_tools::{ToolCall, ToolDefinition, ToolExecutor, ToolResult};

use crate::provider::{ChatMessage, LlmError, ModelProvider, ModelResponse, StopReason};

/// Static system prompt, built once per query instead of per call.
pub const SYSTEM_PROMPT: &str = "\
You are an AI assistant specialized in course materials and educational content \
with access to a comprehensive search tool for course information.

Search Tool Usage:
- Use the search tool **only** for questions about specific course content or detailed educational materials
- **One search per query maximum**
- Synthesize search results into accurate, fact-based responses
- If search yields no results, state this clearly without offering alternatives

Response Protocol:
- **General knowledge questions**: Answer using existing knowledge without searching
- **Course-specific questions**: Search first, then answer
- **No meta-commentary**:
 - Provide direct answers only — no reasoning process, search explanations, or question-type analysis
 - Do not mention \"based on the search results\"

All responses must be:
1. **Brief, Concise and focused** - Get to the point quickly
2. **Educational** - Maintain instructional value
3. **Clear** - Use accessible language
4. **Example-supported** - Include relevant examples when they aid understanding
Provide only the direct answer to what was asked.";

/// Common contract of the live orchestrator and the deterministic
/// simulation path: answer text out, citations via the executor's
/// source side-channel.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        query: &str,
        history: Option<&str>,
        tools: &[ToolDefinition],
        executor: Option<&dyn ToolExecutor>,
    ) -> Result<String, GenerateError>;
}

pub struct ResponseGenerator {
    provider: Arc<dyn ModelProvider>,
    temperature: f32,
    max_tokens: u32,
}

impl ResponseGenerator {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            // Deterministic sampling, bounded answers.
            temperature: 0.0,
            max_tokens: 800,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// System content is built once and reused unchanged for the follow-up call.
    fn system_content(history: Option<&str>) -> String {
        match history {
            Some(h) => format!("{SYSTEM_PROMPT}\n\nPrevious conversation:\n{h}"),
            None => SYSTEM_PROMPT.to_string(),
        }
    }

    /// Execute every requested call through the executor. Calls run
    /// concurrently; `join_all` returns results in request order, which is
    /// what the model expects for id pairing. An executor failure is caught
    /// per call and substituted so the round still completes.
    async fn run_tool_round(executor: &dyn ToolExecutor, calls: &[ToolCall]) -> Vec<ToolResult> {
        let futures = calls.iter().map(|call| async move {
            match executor.execute_tool(&call.name, call.input.clone()).await {
                Ok(content) => ToolResult {
                    tool_call_id: call.id.clone(),
                    content,
                    is_error: false,
                },
                Err(e) => {
                    warn!(tool = %call.name, error = %e, "tool execution failed");
                    ToolResult {
                        tool_call_id: call.id.clone(),
                        content: format!("Tool error: {e}"),
                        is_error: true,
                    }
                }
            }
        });
        join_all(futures).await
    }

    async fn finish_tool_round(
        &self,
        mut messages: Vec<ChatMessage>,
        system: &str,
        response: ModelResponse,
        executor: &dyn ToolExecutor,
    ) -> Result<String, GenerateError> {
        let calls = response.tool_calls();
        info!(count = calls.len(), "executing tool round");

        // The assistant message goes back verbatim, tool_use blocks included,
        // so the model sees what it asked for.
        messages.push(ChatMessage::Assistant(response.content));

        let results = Self::run_tool_round(executor, &calls).await;
        if !results.is_empty() {
            messages.push(ChatMessage::ToolResults(results));
        }

        // The follow-up goes out without tool definitions: one tool round
        // per query, enforced structurally rather than by convention.
        let followup = self
            .provider
            .complete(messages, system, &[], self.temperature, self.max_tokens)
            .await?;
        followup
            .first_text()
            .map(str::to_string)
            .ok_or(GenerateError::EmptyResponse)
    }
}

#[async_trait]
impl Generator for ResponseGenerator {
    async fn generate(
        &self,
        query: &str,
        history: Option<&str>,
        tools: &[ToolDefinition],
        executor: Option<&dyn ToolExecutor>,
    ) -> Result<String, GenerateError> {
        let system = Self::system_content(history);
        let messages = vec![ChatMessage::User(query.to_string())];

        let response = self
            .provider
            .complete(
                messages.clone(),
                &system,
                tools,
                self.temperature,
                self.max_tokens,
            )
            .await?;

        if response.stop_reason == StopReason::ToolUse {
            if let Some(executor) = executor {
                return self
                    .finish_tool_round(messages, &system, response, executor)
                    .await;
            }
            // No executor wired: degrade to whatever text the first call produced.
            warn!("model requested tools but no executor was supplied");
        }

        response
            .first_text()
            .map(str::to_string)
            .ok_or(GenerateError::EmptyResponse)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("model call failed: {0}")]
    Provider(#[from] LlmError),
    #[error("model response contained no text")]
    EmptyResponse,
}
