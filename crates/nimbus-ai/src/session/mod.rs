//! Conversation session management.
//!
//! A `Session` holds the conversation history (messages), the tool
//! registry, and runs the tool-call exchange for each round.

mod chat;
mod manager;
mod types;

#[cfg(test)]
mod tests;

pub use manager::Session;
pub use types::TurnReply;
