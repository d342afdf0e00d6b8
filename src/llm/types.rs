//! Common types for completion requests

use crate::history::ConversationRecord;

/// Completion request
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub messages: Vec<ConversationRecord>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Completion response
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
    /// Provider's stop reason (`stop`, `length`, ...)
    pub finish_reason: Option<String>,
    pub usage: Usage,
}

impl LlmResponse {
    /// Whether generation stopped on the token limit rather than naturally
    pub fn was_truncated(&self) -> bool {
        self.finish_reason.as_deref() == Some("length")
    }
}

/// Usage statistics
#[derive(Debug, Clone, Default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
