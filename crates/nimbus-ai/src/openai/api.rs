//! AiClient trait implementation for OpenAiClient (send_message + streaming).

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::streaming::parse_sse_stream;
use crate::{AiClient, AiError, AiResponse, Disposition, Message, TokenUsage, ToolCall, ToolDefinition};

use super::client::{parse_usage, OpenAiClient, OPENAI_API_URL};

#[async_trait]
impl AiClient for OpenAiClient {
    async fn send_message(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<AiResponse, AiError> {
        let body = self.build_request_body(messages, tools, false);

        debug!(model = %self.config.model, "Chat Completions request");

        let response = self
            .http
            .post(OPENAI_API_URL)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout
                } else {
                    AiError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AiError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let text = text.chars().take(200).collect::<String>();
            return Err(AiError::ApiError(format!("HTTP {status}: {text}")));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AiError::ParseError(e.to_string()))?;

        self.parse_response(json)
    }

    async fn send_message_streaming(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        on_chunk: Box<dyn Fn(String) + Send + Sync>,
    ) -> Result<AiResponse, AiError> {
        let body = self.build_request_body(messages, tools, true);

        debug!(model = %self.config.model, "Chat Completions streaming request");

        let response = self
            .http
            .post(OPENAI_API_URL)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout
                } else {
                    AiError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AiError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let text = text.chars().take(200).collect::<String>();
            return Err(AiError::ApiError(format!("HTTP {status}: {text}")));
        }

        let mut full_content = String::new();
        let mut usage = TokenUsage::default();

        // Tool-call fragments arrive spread across chunks, keyed by index.
        let mut pending_calls: Vec<(String, String, String)> = Vec::new();

        parse_sse_stream(response, |data| {
            let Ok(chunk) = serde_json::from_str::<serde_json::Value>(data) else {
                return;
            };

            // The final chunk carries usage with an empty choices array.
            if let Some(u) = chunk.get("usage").filter(|u| !u.is_null()) {
                usage = parse_usage(u);
            }

            let delta = &chunk["choices"][0]["delta"];

            if let Some(text) = delta["content"].as_str() {
                if !text.is_empty() {
                    full_content.push_str(text);
                    on_chunk(text.to_string());
                }
            }

            if let Some(calls) = delta["tool_calls"].as_array() {
                for call in calls {
                    let index = call["index"].as_u64().unwrap_or(0) as usize;
                    while pending_calls.len() <= index {
                        pending_calls.push((String::new(), String::new(), String::new()));
                    }
                    let slot = &mut pending_calls[index];
                    if let Some(id) = call["id"].as_str() {
                        slot.0.push_str(id);
                    }
                    if let Some(name) = call["function"]["name"].as_str() {
                        slot.1.push_str(name);
                    }
                    if let Some(arguments) = call["function"]["arguments"].as_str() {
                        slot.2.push_str(arguments);
                    }
                }
            }
        })
        .await?;

        if usage.total_tokens() == 0 {
            warn!("No usage data received in streaming response");
        }

        let disposition = if pending_calls.is_empty() {
            Disposition::Text(full_content)
        } else {
            if pending_calls.len() > 1 {
                warn!(
                    count = pending_calls.len(),
                    "model returned multiple tool calls; using the first"
                );
            }
            let (id, name, arguments) = pending_calls.swap_remove(0);
            Disposition::ToolCall(ToolCall {
                id,
                name,
                arguments,
            })
        };

        Ok(AiResponse { disposition, usage })
    }
}
