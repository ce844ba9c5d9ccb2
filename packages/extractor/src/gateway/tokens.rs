//! Token counting.

use llm_client::Message;

/// Framing tokens charged per chat message.
const PER_MESSAGE_OVERHEAD: u64 = 3;

/// Framing tokens charged once per request (assistant reply priming).
const PER_REQUEST_OVERHEAD: u64 = 3;

/// Counts tokens for accounting purposes.
pub trait TokenCounter: Send + Sync {
    /// Tokens in a piece of text.
    fn count_text(&self, text: &str) -> u64;

    /// Tokens in a full message list, framing included.
    fn count_messages(&self, messages: &[Message]) -> u64 {
        messages
            .iter()
            .map(|m| PER_MESSAGE_OVERHEAD + self.count_text(&m.role) + self.count_text(&m.content))
            .sum::<u64>()
            + PER_REQUEST_OVERHEAD
    }
}

/// Four characters per token, rounded up.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicTokenCounter;

impl TokenCounter for HeuristicTokenCounter {
    fn count_text(&self, text: &str) -> u64 {
        (text.chars().count() as u64).div_ceil(4)
    }
}
