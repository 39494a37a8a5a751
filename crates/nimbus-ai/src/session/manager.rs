//! Session struct and conversation management.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::token_tracker::TokenTracker;
use crate::tools::ToolRegistry;
use crate::{Message, Role};

/// A conversation session with message history and tool execution.
pub struct Session {
    /// Conversation message history. Committed rounds only; a failed round
    /// never leaves partial messages behind.
    pub(super) messages: Vec<Message>,
    /// System prompt (prepended to every API call).
    pub(super) system_prompt: Option<String>,
    /// Capabilities advertised on the first call of every round.
    pub(super) registry: Arc<ToolRegistry>,
    /// Token usage tracker.
    pub(super) tracker: TokenTracker,
    /// Provider name for token tracking.
    pub(super) provider: String,
    /// Whether the session is currently processing a request.
    pub(super) busy: AtomicBool,
}

impl Session {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            system_prompt: None,
            registry: Arc::new(ToolRegistry::new()),
            tracker: TokenTracker::new(),
            provider: provider.into(),
            busy: AtomicBool::new(false),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub(super) fn build_messages(&self) -> Vec<Message> {
        let mut msgs = Vec::new();
        if let Some(ref system) = self.system_prompt {
            msgs.push(Message {
                role: Role::System,
                content: system.clone(),
                tool_calls: Vec::new(),
                tool_call_id: None,
            });
        }
        msgs.extend(self.messages.clone());
        msgs
    }

    /// Get the full conversation history.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Get the token tracker.
    pub fn tracker(&self) -> &TokenTracker {
        &self.tracker
    }

    /// Clear conversation history.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Number of messages in history.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new("default")
    }
}
