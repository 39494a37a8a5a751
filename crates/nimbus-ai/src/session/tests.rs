//! Session round tests against scripted fake clients. No network involved.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use crate::tools::{Tool, ToolRegistry};
use crate::{
    AiClient, AiError, AiResponse, Disposition, Message, Role, TokenUsage, ToolCall,
    ToolDefinition,
};

use super::Session;

/// Replays a scripted sequence of responses, recording each call's request
/// messages and how many tool declarations it carried.
struct ScriptedClient {
    script: Mutex<Vec<Result<AiResponse, AiError>>>,
    calls: AtomicU32,
    requests: Mutex<Vec<(Vec<Message>, usize)>>,
}

impl ScriptedClient {
    fn new(script: Vec<Result<AiResponse, AiError>>) -> Self {
        Self {
            script: Mutex::new(script),
            calls: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn declarations_per_call(&self) -> Vec<usize> {
        self.requests.lock().unwrap().iter().map(|r| r.1).collect()
    }

    fn request_messages(&self, call: usize) -> Vec<Message> {
        self.requests.lock().unwrap()[call].0.clone()
    }
}

#[async_trait]
impl AiClient for ScriptedClient {
    async fn send_message(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<AiResponse, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((messages.to_vec(), tools.len()));
        self.script.lock().unwrap().remove(0)
    }

    async fn send_message_streaming(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        on_chunk: Box<dyn Fn(String) + Send + Sync>,
    ) -> Result<AiResponse, AiError> {
        let response = self.send_message(messages, tools).await?;
        if let Disposition::Text(ref text) = response.disposition {
            on_chunk(text.clone());
        }
        Ok(response)
    }
}

fn usage(prompt: u64, completion: u64) -> TokenUsage {
    TokenUsage {
        prompt_tokens: prompt,
        completion_tokens: completion,
        reasoning_tokens: 0,
    }
}

fn text_reply(text: &str, prompt: u64, completion: u64) -> Result<AiResponse, AiError> {
    Ok(AiResponse {
        disposition: Disposition::Text(text.into()),
        usage: usage(prompt, completion),
    })
}

fn tool_reply(name: &str, arguments: &str) -> Result<AiResponse, AiError> {
    Ok(AiResponse {
        disposition: Disposition::ToolCall(ToolCall {
            id: "call_1".into(),
            name: name.into(),
            arguments: arguments.into(),
        }),
        usage: usage(10, 5),
    })
}

/// Tool that echoes its arguments back as the payload.
struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "echo".into(),
            description: "Echo the arguments".into(),
            parameters: json!({"type": "object"}),
        }
    }

    async fn invoke(&self, arguments: &serde_json::Value) -> serde_json::Value {
        json!({ "echoed": arguments })
    }
}

fn session_with_echo() -> Session {
    let registry = ToolRegistry::new().with_tool(Arc::new(EchoTool));
    Session::new("test").with_registry(Arc::new(registry))
}

#[tokio::test]
async fn plain_text_round_is_one_call_two_messages() {
    let client = ScriptedClient::new(vec![text_reply("hello there", 12, 4)]);
    let mut session = session_with_echo();

    let reply = session.chat(&client, "hi").await.unwrap();

    assert_eq!(reply.text, "hello there");
    assert_eq!(reply.usage.total_tokens(), 16);
    assert_eq!(client.calls(), 1);
    assert_eq!(session.message_count(), 2);
    assert_eq!(session.messages()[0].role, Role::User);
    assert_eq!(session.messages()[1].role, Role::Assistant);
}

#[tokio::test]
async fn tool_round_is_two_calls_four_messages() {
    let client = ScriptedClient::new(vec![
        tool_reply("echo", "{\"city\":\"San Diego\"}"),
        text_reply("It's 72°F in San Diego.", 30, 8),
    ]);
    let mut session = session_with_echo();

    let reply = session.chat(&client, "San Diego").await.unwrap();

    assert_eq!(reply.text, "It's 72°F in San Diego.");
    assert_eq!(client.calls(), 2);
    assert_eq!(session.message_count(), 4);

    let messages = session.messages();
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[2].role, Role::Tool);
    assert_eq!(messages[3].role, Role::Assistant);

    // The tool result answers the invocation right before it.
    assert_eq!(messages[1].tool_calls.len(), 1);
    assert_eq!(
        messages[2].tool_call_id.as_deref(),
        Some(messages[1].tool_calls[0].id.as_str())
    );

    // First call advertises the registry, the second none.
    assert_eq!(client.declarations_per_call(), vec![1, 0]);
}

#[tokio::test]
async fn tool_result_carries_invocation_outcome() {
    let client = ScriptedClient::new(vec![
        tool_reply("echo", "{\"city\":\"Tokyo\"}"),
        text_reply("done", 1, 1),
    ]);
    let mut session = session_with_echo();
    session.chat(&client, "Tokyo").await.unwrap();

    let result: serde_json::Value =
        serde_json::from_str(&session.messages()[2].content).unwrap();
    assert_eq!(result["echoed"]["city"], "Tokyo");

    // The second request saw the staged tool exchange.
    let second_request = client.request_messages(1);
    assert_eq!(second_request.len(), 3);
    assert_eq!(second_request[1].role, Role::Assistant);
    assert_eq!(second_request[2].role, Role::Tool);
}

#[tokio::test]
async fn system_prompt_heads_every_request() {
    let client = ScriptedClient::new(vec![text_reply("ok", 1, 1)]);
    let mut session = session_with_echo().with_system_prompt("be brief");
    session.chat(&client, "hi").await.unwrap();

    let request = client.request_messages(0);
    assert_eq!(request[0].role, Role::System);
    assert_eq!(request[0].content, "be brief");
    // The system prompt is injected per request, not committed to history.
    assert_eq!(session.message_count(), 2);
}

#[tokio::test]
async fn unknown_tool_fails_round_and_keeps_history() {
    let client = ScriptedClient::new(vec![tool_reply("teleport", "{}")]);
    let mut session = session_with_echo();

    let result = session.chat(&client, "beam me up").await;

    assert!(matches!(result, Err(AiError::UnknownTool(ref name)) if name == "teleport"));
    assert_eq!(session.message_count(), 0);
    // The first call completed, so its usage stays recorded.
    assert_eq!(session.tracker().call_count(), 1);
    assert_eq!(session.tracker().total_tokens(), 15);
}

#[tokio::test]
async fn malformed_tool_arguments_fail_round() {
    let client = ScriptedClient::new(vec![tool_reply("echo", "{not json")]);
    let mut session = session_with_echo();

    let result = session.chat(&client, "hi").await;

    assert!(matches!(result, Err(AiError::InvalidToolArguments(_))));
    assert_eq!(session.message_count(), 0);
}

#[tokio::test]
async fn first_call_failure_leaves_session_untouched() {
    let client = ScriptedClient::new(vec![Err(AiError::ApiError("HTTP 401: bad key".into()))]);
    let mut session = session_with_echo();

    let result = session.chat(&client, "hi").await;

    assert!(matches!(result, Err(AiError::ApiError(_))));
    assert_eq!(session.message_count(), 0);
    assert_eq!(session.tracker().call_count(), 0);
    assert_eq!(session.tracker().total_tokens(), 0);
}

#[tokio::test]
async fn second_call_failure_keeps_first_call_usage() {
    let client = ScriptedClient::new(vec![
        tool_reply("echo", "{}"),
        Err(AiError::NetworkError("connection reset".into())),
    ]);
    let mut session = session_with_echo();

    let result = session.chat(&client, "hi").await;

    assert!(matches!(result, Err(AiError::NetworkError(_))));
    assert_eq!(session.message_count(), 0);
    assert_eq!(session.tracker().call_count(), 1);
    assert_eq!(session.tracker().total_tokens(), 15);
}

#[tokio::test]
async fn tool_round_usage_sums_both_calls() {
    let client = ScriptedClient::new(vec![
        tool_reply("echo", "{}"),
        text_reply("done", 7, 3),
    ]);
    let mut session = session_with_echo();

    let reply = session.chat(&client, "hi").await.unwrap();

    assert_eq!(reply.usage.prompt_tokens, 17);
    assert_eq!(reply.usage.completion_tokens, 8);
    assert_eq!(reply.usage.total_tokens(), 25);
    assert_eq!(session.tracker().total_tokens(), 25);
}

#[tokio::test]
async fn usage_accumulates_across_rounds() {
    let client = ScriptedClient::new(vec![
        text_reply("first", 10, 2),
        text_reply("second", 20, 4),
    ]);
    let mut session = session_with_echo();

    let first = session.chat(&client, "one").await.unwrap();
    let second = session.chat(&client, "two").await.unwrap();

    assert_eq!(first.usage.total_tokens(), 12);
    assert_eq!(second.usage.total_tokens(), 24);
    assert_eq!(session.tracker().total_tokens(), 36);
    assert_eq!(session.tracker().call_count(), 2);
    assert_eq!(session.message_count(), 4);
}

#[tokio::test]
async fn history_persists_into_later_rounds() {
    let client = ScriptedClient::new(vec![
        text_reply("first answer", 1, 1),
        text_reply("second answer", 1, 1),
    ]);
    let mut session = session_with_echo();

    session.chat(&client, "one").await.unwrap();
    session.chat(&client, "two").await.unwrap();

    // The second request replays the committed first round.
    let request = client.request_messages(1);
    assert_eq!(request.len(), 3);
    assert_eq!(request[0].content, "one");
    assert_eq!(request[1].content, "first answer");
    assert_eq!(request[2].content, "two");
}

#[tokio::test]
async fn streaming_round_forwards_chunks() {
    let client = ScriptedClient::new(vec![
        tool_reply("echo", "{\"city\":\"Paris\"}"),
        text_reply("It's 18°C in Paris.", 5, 5),
    ]);
    let mut session = session_with_echo();

    let seen = Arc::new(Mutex::new(String::new()));
    let sink = Arc::clone(&seen);
    let reply = session
        .chat_streaming(
            &client,
            "Paris",
            Box::new(move |chunk| sink.lock().unwrap().push_str(&chunk)),
        )
        .await
        .unwrap();

    assert_eq!(reply.text, "It's 18°C in Paris.");
    assert_eq!(*seen.lock().unwrap(), "It's 18°C in Paris.");
    assert_eq!(session.message_count(), 4);
}
