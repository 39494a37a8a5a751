//! Session types and concurrency guards.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::{AiError, TokenUsage};

/// The outcome of one round: the assistant's final answer plus the token
/// usage summed over the round's chat calls.
#[derive(Debug, Clone)]
pub struct TurnReply {
    pub text: String,
    pub usage: TokenUsage,
}

/// Guard that clears the `busy` flag on drop, ensuring it is always released
/// even if the future is cancelled or an early return occurs.
pub(crate) struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    /// Attempt to acquire the busy lock. Returns `Err` if already busy.
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Result<Self, AiError> {
        if flag
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(AiError::Busy);
        }
        Ok(Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
