//! OpenAI Chat Completions client.
//!
//! Implements the `AiClient` trait for OpenAI models via the
//! Chat Completions API (https://api.openai.com/v1/chat/completions),
//! with function calling and SSE streaming.

mod api;
mod client;
mod config;

pub use client::OpenAiClient;
pub use config::OpenAiConfig;
