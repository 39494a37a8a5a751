//! Tool registry for capabilities exposed to AI models.
//!
//! Each capability is one registry entry (name, schema, handler), so
//! unknown-tool handling and future additions share a single dispatch path.

use std::sync::Arc;

use async_trait::async_trait;

use crate::ToolDefinition;

/// A local capability the model can invoke.
///
/// Implementations receive parsed JSON arguments and return a JSON payload.
/// Operational failures (lookup misses, transport errors) must be folded
/// into the returned payload so the model can react conversationally; only
/// the session treats contract violations as hard errors.
#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    async fn invoke(&self, arguments: &serde_json::Value) -> serde_json::Value;
}

/// Registry of callable tools, keyed by declared name.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Look up a tool by its declared name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.definition().name == name)
    }

    /// Definitions advertised to the model, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a tool definition to the OpenAI function-calling format.
pub fn to_openai_tool(tool: &ToolDefinition) -> serde_json::Value {
    serde_json::json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
        }
    })
}
