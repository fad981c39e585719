//! Anthropic Messages API implementation of [`ModelProvider`].
//!
//! Translates between the provider-agnostic [`ChatMessage`] / [`ContentBlock`]
//! types and the Messages API wire format (`/v1/messages`, non-streaming).

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use coursebot_tools::ToolDefinition;

use crate::provider::{
    ChatMessage, ContentBlock, LlmError, ModelProvider, ModelResponse, StopReason,
};

pub struct ClaudeProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl ClaudeProvider {
    /// # Arguments
    /// * `api_key` - Anthropic API key
    /// * `model` - Model name (e.g. `"claude-3-5-haiku-20241022"`)
    /// * `base_url` - API base URL (e.g. `"https://api.anthropic.com"`)
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire translation
// ---------------------------------------------------------------------------

fn tool_definition_to_wire(tool: &ToolDefinition) -> Value {
    json!({
        "name": tool.name,
        "description": tool.description,
        "input_schema": tool.input_schema,
    })
}

fn block_to_wire(block: &ContentBlock) -> Value {
    match block {
        ContentBlock::Text { text } => json!({"type": "text", "text": text}),
        ContentBlock::ToolUse { id, name, input } => json!({
            "type": "tool_use",
            "id": id,
            "name": name,
            "input": input,
        }),
    }
}

fn message_to_wire(msg: &ChatMessage) -> Value {
    match msg {
        ChatMessage::User(text) => json!({
            "role": "user",
            "content": text,
        }),
        ChatMessage::Assistant(blocks) => json!({
            "role": "assistant",
            "content": blocks.iter().map(block_to_wire).collect::<Vec<_>>(),
        }),
        ChatMessage::ToolResults(results) => json!({
            "role": "user",
            "content": results
                .iter()
                .map(|r| json!({
                    "type": "tool_result",
                    "tool_use_id": r.tool_call_id,
                    "content": r.content,
                    "is_error": r.is_error,
                }))
                .collect::<Vec<_>>(),
        }),
    }
}

fn parse_stop_reason(raw: Option<&str>) -> StopReason {
    match raw {
        Some("tool_use") => StopReason::ToolUse,
        Some("max_tokens") => StopReason::MaxTokens,
        Some("stop_sequence") => StopReason::StopSequence,
        _ => StopReason::EndTurn,
    }
}

fn parse_content_blocks(raw: &Value) -> Result<Vec<ContentBlock>, LlmError> {
    let blocks = raw
        .as_array()
        .ok_or_else(|| LlmError::Parse("content is not an array".to_string()))?;

    blocks
        .iter()
        .map(|block| match block["type"].as_str() {
            Some("text") => Ok(ContentBlock::Text {
                text: block["text"].as_str().unwrap_or_default().to_string(),
            }),
            Some("tool_use") => Ok(ContentBlock::ToolUse {
                id: block["id"].as_str().unwrap_or_default().to_string(),
                name: block["name"].as_str().unwrap_or_default().to_string(),
                input: block["input"].clone(),
            }),
            other => Err(LlmError::Parse(format!(
                "unknown content block type {other:?}"
            ))),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl ModelProvider for ClaudeProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        system: &str,
        tools: &[ToolDefinition],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<ModelResponse, LlmError> {
        let url = format!("{}/v1/messages", self.base_url);

        let wire_messages: Vec<Value> = messages.iter().map(message_to_wire).collect();

        let mut body = json!({
            "model": self.model,
            "messages": wire_messages,
            "temperature": temperature,
            "max_tokens": max_tokens,
            "system": system,
        });

        if !tools.is_empty() {
            body["tools"] = Value::Array(tools.iter().map(tool_definition_to_wire).collect());
            // The model decides for itself whether to invoke a tool.
            body["tool_choice"] = json!({"type": "auto"});
        }

        debug!(model = %self.model, url = %url, "sending messages request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status == 401 {
            return Err(LlmError::Auth);
        }
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, body });
        }

        let parsed: Value = response.json().await?;
        Ok(ModelResponse {
            stop_reason: parse_stop_reason(parsed["stop_reason"].as_str()),
            content: parse_content_blocks(&parsed["content"])?,
        })
    }

    fn provider_name(&self) -> &str {
        "claude"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use coursebot_tools::ToolResult;

    #[test]
    fn test_tool_definition_translation() {
        let def = ToolDefinition {
            name: "search_course_content".to_string(),
            description: "Search course materials".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "What to search for" }
                },
                "required": ["query"]
            }),
        };

        let wire = tool_definition_to_wire(&def);

        assert_eq!(wire["name"], "search_course_content");
        assert_eq!(wire["description"], "Search course materials");
        assert_eq!(wire["input_schema"]["type"], "object");
        assert_eq!(wire["input_schema"]["required"][0], "query");
    }

    #[test]
    fn test_user_message_translation() {
        let wire = message_to_wire(&ChatMessage::User("What is MCP?".to_string()));

        assert_eq!(wire["role"], "user");
        assert_eq!(wire["content"], "What is MCP?");
    }

    #[test]
    fn test_assistant_mixed_content_translation() {
        let wire = message_to_wire(&ChatMessage::Assistant(vec![
            ContentBlock::Text {
                text: "Let me check that.".to_string(),
            },
            ContentBlock::ToolUse {
                id: "toolu_01".to_string(),
                name: "search_course_content".to_string(),
                input: json!({"query": "mcp deployment"}),
            },
        ]));

        let content = wire["content"].as_array().unwrap();
        assert_eq!(wire["role"], "assistant");
        assert_eq!(content.len(), 2);
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[1]["type"], "tool_use");
        assert_eq!(content[1]["id"], "toolu_01");
        assert_eq!(content[1]["input"]["query"], "mcp deployment");
    }

    #[test]
    fn test_tool_results_translation() {
        let wire = message_to_wire(&ChatMessage::ToolResults(vec![ToolResult {
            tool_call_id: "toolu_01".to_string(),
            content: "[Course 1 - Lesson 1]\ncontent".to_string(),
            is_error: false,
        }]));

        assert_eq!(wire["role"], "user");
        let content = wire["content"].as_array().unwrap();
        assert_eq!(content[0]["type"], "tool_result");
        assert_eq!(content[0]["tool_use_id"], "toolu_01");
        assert!(!content[0]["is_error"].as_bool().unwrap());
    }

    #[test]
    fn test_stop_reason_parsing() {
        assert_eq!(parse_stop_reason(Some("end_turn")), StopReason::EndTurn);
        assert_eq!(parse_stop_reason(Some("tool_use")), StopReason::ToolUse);
        assert_eq!(parse_stop_reason(Some("max_tokens")), StopReason::MaxTokens);
        assert_eq!(
            parse_stop_reason(Some("stop_sequence")),
            StopReason::StopSequence
        );
        assert_eq!(parse_stop_reason(None), StopReason::EndTurn);
    }

    #[test]
    fn test_content_block_parsing() {
        let raw = json!([
            {"type": "text", "text": "Checking the course."},
            {"type": "tool_use", "id": "toolu_02", "name": "search_course_content",
             "input": {"query": "outline", "course_name": "MCP"}}
        ]);

        let blocks = parse_content_blocks(&raw).unwrap();
        assert_eq!(blocks.len(), 2);
        match &blocks[1] {
            ContentBlock::ToolUse { id, name, input } => {
                assert_eq!(id, "toolu_02");
                assert_eq!(name, "search_course_content");
                assert_eq!(input["course_name"], "MCP");
            }
            other => panic!("expected ToolUse, got {other:?}"),
        }
    }

    #[test]
    fn test_content_block_parsing_rejects_unknown_type() {
        let raw = json!([{"type": "thinking", "thinking": "hmm"}]);
        assert!(matches!(
            parse_content_blocks(&raw),
            Err(LlmError::Parse(_))
        ));
    }
}
