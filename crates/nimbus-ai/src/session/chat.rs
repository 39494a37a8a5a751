//! Async chat methods for Session (send_message + streaming).

use std::sync::Arc;

use tracing::debug;

use crate::{AiClient, AiError, Disposition, Message, ToolCall};

use super::manager::Session;
use super::types::{BusyGuard, TurnReply};

impl Session {
    /// Add a user message and get the assistant's response.
    ///
    /// If the model invokes a tool, this runs one tool exchange: execute the
    /// capability, feed the result back, and return the confirming answer.
    /// All of a round's messages are staged and committed together, so a
    /// round that fails leaves the history exactly as it was. Usage from
    /// calls that did complete stays recorded in the tracker.
    pub async fn chat(
        &mut self,
        client: &dyn AiClient,
        user_message: impl Into<String>,
    ) -> Result<TurnReply, AiError> {
        let _guard = BusyGuard::acquire(&self.busy)?;

        let mut pending = vec![Message::user(user_message)];

        let mut request = self.build_messages();
        request.extend(pending.iter().cloned());

        let definitions = self.registry.definitions();
        let first = client.send_message(&request, &definitions).await?;
        self.tracker.record(&self.provider, &first.usage);
        let mut usage = first.usage;

        let call = match first.disposition {
            Disposition::Text(text) => {
                pending.push(Message::assistant(text.clone()));
                self.messages.append(&mut pending);
                return Ok(TurnReply { text, usage });
            }
            Disposition::ToolCall(call) => call,
        };

        let outcome = self.run_tool(&call).await?;
        pending.push(Message::tool_call(call.clone()));
        pending.push(Message::tool_result(call.id.clone(), outcome.to_string()));

        let mut request = self.build_messages();
        request.extend(pending.iter().cloned());

        // Second call needs no declarations; the invocation already happened.
        let second = client.send_message(&request, &[]).await?;
        self.tracker.record(&self.provider, &second.usage);
        usage.accumulate(&second.usage);

        match second.disposition {
            Disposition::Text(text) => {
                pending.push(Message::assistant(text.clone()));
                self.messages.append(&mut pending);
                Ok(TurnReply { text, usage })
            }
            Disposition::ToolCall(call) => Err(AiError::ApiError(format!(
                "model requested tool '{}' on a call with no tool declarations",
                call.name
            ))),
        }
    }

    /// Same exchange as [`chat`](Session::chat), with text deltas forwarded
    /// to `on_chunk` as they arrive.
    pub async fn chat_streaming(
        &mut self,
        client: &dyn AiClient,
        user_message: impl Into<String>,
        on_chunk: Box<dyn Fn(String) + Send + Sync>,
    ) -> Result<TurnReply, AiError> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        let on_chunk: Arc<dyn Fn(String) + Send + Sync> = Arc::from(on_chunk);

        let mut pending = vec![Message::user(user_message)];

        let mut request = self.build_messages();
        request.extend(pending.iter().cloned());

        let definitions = self.registry.definitions();
        let first = client
            .send_message_streaming(&request, &definitions, forward_chunks(&on_chunk))
            .await?;
        self.tracker.record(&self.provider, &first.usage);
        let mut usage = first.usage;

        let call = match first.disposition {
            Disposition::Text(text) => {
                pending.push(Message::assistant(text.clone()));
                self.messages.append(&mut pending);
                return Ok(TurnReply { text, usage });
            }
            Disposition::ToolCall(call) => call,
        };

        let outcome = self.run_tool(&call).await?;
        pending.push(Message::tool_call(call.clone()));
        pending.push(Message::tool_result(call.id.clone(), outcome.to_string()));

        let mut request = self.build_messages();
        request.extend(pending.iter().cloned());

        let second = client
            .send_message_streaming(&request, &[], forward_chunks(&on_chunk))
            .await?;
        self.tracker.record(&self.provider, &second.usage);
        usage.accumulate(&second.usage);

        match second.disposition {
            Disposition::Text(text) => {
                pending.push(Message::assistant(text.clone()));
                self.messages.append(&mut pending);
                Ok(TurnReply { text, usage })
            }
            Disposition::ToolCall(call) => Err(AiError::ApiError(format!(
                "model requested tool '{}' on a call with no tool declarations",
                call.name
            ))),
        }
    }

    /// Parse the invocation's arguments and execute the named capability.
    ///
    /// Lookup and transport failures inside the tool come back in-band in
    /// the returned payload; only contract violations (unparseable
    /// arguments, a name outside the registry) are hard errors.
    async fn run_tool(&self, call: &ToolCall) -> Result<serde_json::Value, AiError> {
        let arguments: serde_json::Value = serde_json::from_str(&call.arguments)
            .map_err(|e| AiError::InvalidToolArguments(e.to_string()))?;

        let tool = self
            .registry
            .get(&call.name)
            .ok_or_else(|| AiError::UnknownTool(call.name.clone()))?;

        debug!(tool = %call.name, "Executing tool");
        Ok(tool.invoke(&arguments).await)
    }
}

fn forward_chunks(
    on_chunk: &Arc<dyn Fn(String) + Send + Sync>,
) -> Box<dyn Fn(String) + Send + Sync> {
    let on_chunk = Arc::clone(on_chunk);
    Box::new(move |chunk| on_chunk(chunk))
}
