//! End-to-end handling of a chat or voice turn
//!
//! Generation failures reach the caller; persistence failures never do. A
//! reply that was generated is always returned, even when it could not be
//! written to history.

use crate::assembler;
use crate::config::CompletionConfig;
use crate::history::{ConversationRecord, HistoryStore};
use crate::llm::{
    AudioUpload, LlmError, LlmRequest, LlmService, Providers, SpeechOptions, SpeechSynthesizer,
    Transcriber,
};
use crate::postprocess::postprocess;
use base64::Engine;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Completion failed: {0}")]
    Completion(#[source] LlmError),
    #[error("Transcription failed: {0}")]
    Transcription(#[source] LlmError),
    #[error("Speech synthesis failed: {0}")]
    Speech(#[source] LlmError),
    #[error("Transcription returned no text")]
    EmptyTranscript,
}

/// Result of a voice turn
#[derive(Debug, Clone, Serialize)]
pub struct VoiceReply {
    pub transcript: String,
    pub text: String,
    /// MP3 of `text`; `None` when speech synthesis failed
    pub audio_base64: Option<String>,
}

pub struct ResponseOrchestrator {
    history: Arc<HistoryStore>,
    completion: Arc<dyn LlmService>,
    transcriber: Arc<dyn Transcriber>,
    speech: Arc<dyn SpeechSynthesizer>,
    settings: CompletionConfig,
}

impl ResponseOrchestrator {
    pub fn new(history: Arc<HistoryStore>, providers: Providers, settings: CompletionConfig) -> Self {
        Self {
            history,
            completion: providers.completion,
            transcriber: providers.transcriber,
            speech: providers.speech,
            settings,
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Generate a reply to `user_message` and record the turn
    pub async fn handle_turn(&self, user_message: &str) -> Result<String, GenerationError> {
        let messages = assembler::build_messages(&self.history, user_message).await;

        let request = LlmRequest {
            messages,
            temperature: Some(self.settings.temperature),
            max_tokens: Some(self.settings.max_tokens),
        };
        let response = self
            .completion
            .complete(&request)
            .await
            .map_err(GenerationError::Completion)?;

        let reply = postprocess(&response.text);
        tracing::info!(
            raw_chars = response.text.chars().count(),
            reply_chars = reply.chars().count(),
            "Generated reply"
        );

        if let Err(e) = self.history.append_turn(user_message, &reply).await {
            tracing::error!(error = %e, "Failed to persist turn, returning reply anyway");
        }

        Ok(reply)
    }

    /// Transcribe audio, answer it, and speak the answer
    pub async fn handle_voice_turn(&self, audio: &AudioUpload) -> Result<VoiceReply, GenerationError> {
        let transcript = self
            .transcriber
            .transcribe(audio)
            .await
            .map_err(GenerationError::Transcription)?;
        let transcript = transcript.trim().to_string();
        if transcript.is_empty() {
            return Err(GenerationError::EmptyTranscript);
        }
        tracing::info!(transcript_chars = transcript.chars().count(), "Transcribed voice message");

        // The turn is already recorded, so a speech failure must not hide the reply
        let text = self.handle_turn(&transcript).await?;
        let audio_base64 = match self.synthesize(&text, &SpeechOptions::default()).await {
            Ok(audio) => Some(base64::engine::general_purpose::STANDARD.encode(audio)),
            Err(e) => {
                tracing::warn!(error = %e, "Speech failed, returning text-only voice reply");
                None
            }
        };

        Ok(VoiceReply {
            transcript,
            text,
            audio_base64,
        })
    }

    /// Render text with the configured speech provider
    pub async fn synthesize(&self, text: &str, options: &SpeechOptions) -> Result<Vec<u8>, GenerationError> {
        let audio = self
            .speech
            .synthesize(text, options)
            .await
            .map_err(GenerationError::Speech)?;
        tracing::info!(
            provider = self.speech.provider(),
            audio_bytes = audio.len(),
            "Synthesized speech"
        );
        Ok(audio)
    }

    /// Well-formed records of the shared conversation
    pub async fn conversation(&self) -> Vec<ConversationRecord> {
        self.history.load().await.default_records()
    }
}
