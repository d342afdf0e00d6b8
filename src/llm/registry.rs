//! Provider construction from configuration

use super::{
    ElevenLabsSpeech, LlmError, LlmService, LoggingService, OpenAISpeech, OpenAIService,
    OpenAITranscriber, SpeechSynthesizer, Transcriber,
};
use crate::config::{Config, SpeechConfig};
use std::sync::Arc;

/// Handles to every remote capability the service uses.
///
/// Built once at startup and shared for the life of the process.
#[derive(Clone)]
pub struct Providers {
    pub completion: Arc<dyn LlmService>,
    pub transcriber: Arc<dyn Transcriber>,
    pub speech: Arc<dyn SpeechSynthesizer>,
}

impl Providers {
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let openai = &config.openai;

        let completion = OpenAIService::new(
            openai.api_key.clone(),
            config.completion.model.clone(),
            &openai.base_url,
        )?;

        let transcriber = OpenAITranscriber::new(
            openai.api_key.clone(),
            config.transcription_model.clone(),
            &openai.base_url,
        )?;

        let speech: Arc<dyn SpeechSynthesizer> = match &config.speech {
            SpeechConfig::OpenAI { model, voice } => Arc::new(OpenAISpeech::new(
                openai.api_key.clone(),
                model.clone(),
                voice.clone(),
                &openai.base_url,
            )?),
            SpeechConfig::ElevenLabs {
                api_key,
                voice_id,
                model,
            } => Arc::new(ElevenLabsSpeech::new(
                api_key.clone(),
                model.clone(),
                voice_id.clone(),
            )?),
        };

        Ok(Self {
            completion: Arc::new(LoggingService::new(Arc::new(completion))),
            transcriber: Arc::new(transcriber),
            speech,
        })
    }
}
