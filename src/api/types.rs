//! API request and response types

use crate::history::ConversationRecord;
use serde::{Deserialize, Serialize};

/// Fixed apology shown for any generation failure
pub const APOLOGY_MESSAGE: &str = "عذراً، صار خطأ في النظام. جرب مرة ثانية بعد شوي ✨";

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Reply to a chat message
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Request to render text as speech
#[derive(Debug, Deserialize)]
pub struct SpeakRequest {
    pub text: String,
    pub voice: Option<String>,
    pub rate: Option<f32>,
    pub pitch: Option<f32>,
}

/// Stored conversation
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub messages: Vec<ConversationRecord>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub status: &'static str,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
