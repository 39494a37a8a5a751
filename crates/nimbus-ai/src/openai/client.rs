//! OpenAI client struct, request building, and response parsing.

use tracing::warn;

use crate::tools::to_openai_tool;
use crate::{AiError, AiResponse, Disposition, Message, Role, TokenUsage, ToolCall, ToolDefinition};

use super::config::OpenAiConfig;

pub(crate) const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI API client.
pub struct OpenAiClient {
    pub(crate) config: OpenAiConfig,
    pub(crate) http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    /// Build the JSON request body for the Chat Completions API.
    pub(crate) fn build_request_body(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        stream: bool,
    ) -> serde_json::Value {
        let mut msgs = Vec::new();
        let mut has_system = false;

        for msg in messages {
            match msg.role {
                Role::System => {
                    has_system = true;
                    msgs.push(serde_json::json!({
                        "role": "system",
                        "content": msg.content,
                    }));
                }
                Role::User => {
                    msgs.push(serde_json::json!({
                        "role": "user",
                        "content": msg.content,
                    }));
                }
                Role::Assistant => {
                    if msg.tool_calls.is_empty() {
                        msgs.push(serde_json::json!({
                            "role": "assistant",
                            "content": msg.content,
                        }));
                    } else {
                        let calls: Vec<_> = msg
                            .tool_calls
                            .iter()
                            .map(|c| {
                                serde_json::json!({
                                    "id": c.id,
                                    "type": "function",
                                    "function": {
                                        "name": c.name,
                                        "arguments": c.arguments,
                                    },
                                })
                            })
                            .collect();
                        msgs.push(serde_json::json!({
                            "role": "assistant",
                            "content": serde_json::Value::Null,
                            "tool_calls": calls,
                        }));
                    }
                }
                Role::Tool => {
                    msgs.push(serde_json::json!({
                        "role": "tool",
                        "tool_call_id": msg.tool_call_id,
                        "content": msg.content,
                    }));
                }
            }
        }

        if !has_system {
            if let Some(ref system) = self.config.system_prompt {
                msgs.insert(
                    0,
                    serde_json::json!({
                        "role": "system",
                        "content": system,
                    }),
                );
            }
        }

        let mut body = serde_json::json!({
            "model": self.config.model,
            "messages": msgs,
        });

        if let Some(ref effort) = self.config.reasoning_effort {
            body["reasoning_effort"] = serde_json::json!(effort);
        }
        if let Some(temperature) = self.config.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }
        if let Some(max) = self.config.max_completion_tokens {
            body["max_completion_tokens"] = serde_json::json!(max);
        }

        if !tools.is_empty() {
            let tool_defs: Vec<_> = tools.iter().map(to_openai_tool).collect();
            body["tools"] = serde_json::json!(tool_defs);
        }

        if stream {
            body["stream"] = serde_json::json!(true);
            body["stream_options"] = serde_json::json!({ "include_usage": true });
        }

        body
    }

    /// Parse a non-streaming response.
    pub(crate) fn parse_response(&self, json: serde_json::Value) -> Result<AiResponse, AiError> {
        let message = &json["choices"][0]["message"];
        if message.is_null() {
            return Err(AiError::ParseError("no choices in response".to_string()));
        }

        let usage = parse_usage(&json["usage"]);

        let disposition = match message["tool_calls"].as_array() {
            Some(calls) if !calls.is_empty() => {
                if calls.len() > 1 {
                    warn!(
                        count = calls.len(),
                        "model returned multiple tool calls; using the first"
                    );
                }
                let call = &calls[0];
                Disposition::ToolCall(ToolCall {
                    id: call["id"].as_str().unwrap_or("").to_string(),
                    name: call["function"]["name"].as_str().unwrap_or("").to_string(),
                    arguments: call["function"]["arguments"]
                        .as_str()
                        .unwrap_or("{}")
                        .to_string(),
                })
            }
            _ => Disposition::Text(message["content"].as_str().unwrap_or_default().to_string()),
        };

        Ok(AiResponse { disposition, usage })
    }
}

/// Extract token counts from a `usage` object, zero when absent.
pub(crate) fn parse_usage(usage: &serde_json::Value) -> TokenUsage {
    TokenUsage {
        prompt_tokens: usage["prompt_tokens"].as_u64().unwrap_or(0),
        completion_tokens: usage["completion_tokens"].as_u64().unwrap_or(0),
        reasoning_tokens: usage["completion_tokens_details"]["reasoning_tokens"]
            .as_u64()
            .unwrap_or(0),
    }
}
