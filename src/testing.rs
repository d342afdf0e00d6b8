//! Mock providers for testing
//!
//! These mocks let the orchestrator and HTTP layer run without network I/O.

use crate::llm::{
    AudioUpload, LlmError, LlmRequest, LlmResponse, LlmService, SpeechOptions, SpeechSynthesizer,
    Transcriber, Usage,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A plain text completion that stopped naturally
pub fn text_response(text: &str) -> LlmResponse {
    LlmResponse {
        text: text.to_string(),
        finish_reason: Some("stop".to_string()),
        usage: Usage {
            input_tokens: 10,
            output_tokens: 5,
        },
    }
}

// ============================================================================
// Mock LLM Client
// ============================================================================

/// Mock completion client that returns queued responses
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for MockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Mock Transcriber
// ============================================================================

#[derive(Default)]
pub struct MockTranscriber {
    results: Mutex<VecDeque<Result<String, LlmError>>>,
}

impl MockTranscriber {
    pub fn queue(&self, result: Result<String, LlmError>) {
        self.results.lock().unwrap().push_back(result);
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, _audio: &AudioUpload) -> Result<String, LlmError> {
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock transcript queued")))
    }
}

// ============================================================================
// Mock Speech
// ============================================================================

/// Mock speech provider returning fixed bytes
#[derive(Default)]
pub struct MockSpeech {
    fail_next: AtomicBool,
    spoken: Mutex<Vec<String>>,
}

impl MockSpeech {
    pub const AUDIO: &'static [u8] = b"ID3fake-mp3";

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSpeech {
    async fn synthesize(&self, text: &str, _options: &SpeechOptions) -> Result<Vec<u8>, LlmError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(LlmError::server_error("speech backend down"));
        }
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(Self::AUDIO.to_vec())
    }

    fn provider(&self) -> &'static str {
        "mock"
    }
}
