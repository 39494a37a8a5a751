//! Token usage tracking across sessions and providers.

use std::collections::HashMap;

use crate::TokenUsage;

/// Tracks cumulative token usage per provider and per session.
pub struct TokenTracker {
    /// Total usage across all providers.
    total: TokenUsage,
    /// Usage broken down by provider name.
    by_provider: HashMap<String, TokenUsage>,
    /// Number of API calls made.
    call_count: u64,
}

impl TokenTracker {
    pub fn new() -> Self {
        Self {
            total: TokenUsage::default(),
            by_provider: HashMap::new(),
            call_count: 0,
        }
    }

    /// Record token usage from an API call.
    pub fn record(&mut self, provider: &str, usage: &TokenUsage) {
        self.total.accumulate(usage);
        self.call_count += 1;

        self.by_provider
            .entry(provider.to_string())
            .or_default()
            .accumulate(usage);
    }

    /// Get total token usage.
    pub fn total(&self) -> &TokenUsage {
        &self.total
    }

    /// Get usage for a specific provider.
    pub fn for_provider(&self, provider: &str) -> Option<&TokenUsage> {
        self.by_provider.get(provider)
    }

    /// Get total tokens (prompt + completion).
    pub fn total_tokens(&self) -> u64 {
        self.total.total_tokens()
    }

    /// Get number of API calls.
    pub fn call_count(&self) -> u64 {
        self.call_count
    }

    /// Reset all counters.
    pub fn reset(&mut self) {
        self.total = TokenUsage::default();
        self.by_provider.clear();
        self.call_count = 0;
    }
}

impl Default for TokenTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(prompt: u64, completion: u64, reasoning: u64) -> TokenUsage {
        TokenUsage {
            prompt_tokens: prompt,
            completion_tokens: completion,
            reasoning_tokens: reasoning,
        }
    }

    #[test]
    fn records_accumulate_per_provider_and_total() {
        let mut tracker = TokenTracker::new();
        tracker.record("openai", &usage(10, 5, 1));
        tracker.record("openai", &usage(20, 10, 0));

        assert_eq!(tracker.call_count(), 2);
        assert_eq!(tracker.total_tokens(), 45);
        assert_eq!(tracker.total().reasoning_tokens, 1);

        let by_provider = tracker.for_provider("openai").unwrap();
        assert_eq!(by_provider.prompt_tokens, 30);
        assert_eq!(by_provider.completion_tokens, 15);
        assert!(tracker.for_provider("other").is_none());
    }

    #[test]
    fn reset_clears_everything() {
        let mut tracker = TokenTracker::new();
        tracker.record("openai", &usage(10, 5, 0));
        tracker.reset();

        assert_eq!(tracker.call_count(), 0);
        assert_eq!(tracker.total_tokens(), 0);
        assert!(tracker.for_provider("openai").is_none());
    }
}
