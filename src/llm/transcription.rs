//! Speech-to-text via the `OpenAI` transcription endpoint

use super::openai::{api_error, endpoint};
use super::{build_http_client, LlmError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

/// Upper bound accepted by the transcription API
pub const MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;

/// Audio received from a client, ready for upload
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: Option<String>,
    /// Optional ISO-639-1 hint, e.g. `ar`
    pub language: Option<String>,
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Turn recorded speech into text
    async fn transcribe(&self, audio: &AudioUpload) -> Result<String, LlmError>;
}

pub struct OpenAITranscriber {
    client: Client,
    api_key: String,
    model: String,
    url: String,
}

impl OpenAITranscriber {
    pub fn new(api_key: String, model: String, base_url: &str) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_http_client()?,
            api_key,
            model,
            url: endpoint(base_url, "audio/transcriptions"),
        })
    }

    fn build_form(&self, audio: &AudioUpload) -> Result<Form, LlmError> {
        let mut part = Part::bytes(audio.bytes.clone()).file_name(audio.filename.clone());
        if let Some(content_type) = &audio.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| LlmError::invalid_request(format!("Invalid audio type: {e}")))?;
        }

        let mut form = Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("response_format", "json");
        if let Some(language) = &audio.language {
            form = form.text("language", language.clone());
        }
        Ok(form)
    }
}

#[async_trait]
impl Transcriber for OpenAITranscriber {
    async fn transcribe(&self, audio: &AudioUpload) -> Result<String, LlmError> {
        if audio.bytes.len() > MAX_AUDIO_BYTES {
            return Err(LlmError::invalid_request(format!(
                "Audio too large ({} bytes, max {MAX_AUDIO_BYTES})",
                audio.bytes.len()
            )));
        }

        let start = std::time::Instant::now();
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .multipart(self.build_form(audio)?)
            .send()
            .await
            .map_err(|e| LlmError::from_transport(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        let parsed: TranscriptionResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::unknown(format!("Failed to parse transcription: {e}")))?;

        tracing::info!(
            model = %self.model,
            duration_ms = %start.elapsed().as_millis(),
            audio_bytes = audio.bytes.len(),
            "Transcription completed"
        );
        Ok(parsed.text)
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}
