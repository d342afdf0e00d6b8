//! Text-to-speech providers
//!
//! Two interchangeable backends: `OpenAI` `audio/speech` and `ElevenLabs`.
//! Both return MP3 bytes.

use super::openai::{api_error, endpoint};
use super::{build_http_client, LlmError};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;

const ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io/v1";

/// Optional per-request voice parameters
#[derive(Debug, Clone, Default)]
pub struct SpeechOptions {
    /// Provider voice name or id; falls back to the configured voice
    pub voice: Option<String>,
    /// Speaking rate multiplier, 1.0 is normal
    pub rate: Option<f32>,
    /// Pitch shift in semitones
    pub pitch: Option<f32>,
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Render `text` to audio bytes
    async fn synthesize(&self, text: &str, options: &SpeechOptions) -> Result<Vec<u8>, LlmError>;

    /// Provider name for logs
    fn provider(&self) -> &'static str;
}

// ============================================================================
// OpenAI
// ============================================================================

pub struct OpenAISpeech {
    client: Client,
    api_key: String,
    model: String,
    voice: String,
    url: String,
}

impl OpenAISpeech {
    pub fn new(api_key: String, model: String, voice: String, base_url: &str) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_http_client()?,
            api_key,
            model,
            voice,
            url: endpoint(base_url, "audio/speech"),
        })
    }

    fn translate_request<'a>(&'a self, text: &'a str, options: &'a SpeechOptions) -> OpenAISpeechRequest<'a> {
        if options.pitch.is_some() {
            tracing::debug!("OpenAI speech has no pitch control, ignoring pitch");
        }
        OpenAISpeechRequest {
            model: &self.model,
            voice: options.voice.as_deref().unwrap_or(&self.voice),
            input: text,
            speed: options.rate.map(|r| r.clamp(0.25, 4.0)),
            response_format: "mp3",
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAISpeech {
    async fn synthesize(&self, text: &str, options: &SpeechOptions) -> Result<Vec<u8>, LlmError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&self.translate_request(text, options))
            .send()
            .await
            .map_err(|e| LlmError::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read audio: {e}")))?;
        Ok(audio.to_vec())
    }

    fn provider(&self) -> &'static str {
        "openai"
    }
}

#[derive(Debug, Serialize)]
struct OpenAISpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    speed: Option<f32>,
    response_format: &'a str,
}

// ============================================================================
// ElevenLabs
// ============================================================================

pub struct ElevenLabsSpeech {
    client: Client,
    api_key: String,
    model: String,
    voice_id: String,
    base_url: String,
}

impl ElevenLabsSpeech {
    pub fn new(api_key: String, model: String, voice_id: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_http_client()?,
            api_key,
            model,
            voice_id,
            base_url: ELEVENLABS_BASE_URL.to_string(),
        })
    }

    /// Voice ids are caller-supplied and must stay a single path segment
    fn url(&self, options: &SpeechOptions) -> Result<Url, LlmError> {
        let voice_id = options.voice.as_deref().unwrap_or(&self.voice_id);
        if voice_id.is_empty()
            || !voice_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(LlmError::invalid_request(format!(
                "Invalid ElevenLabs voice id: {voice_id:?}"
            )));
        }

        let mut url = Url::parse(&endpoint(&self.base_url, "text-to-speech"))
            .map_err(|e| LlmError::invalid_request(format!("Invalid ElevenLabs URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| LlmError::invalid_request("ElevenLabs URL cannot take a path"))?
            .push(voice_id);
        Ok(url)
    }

    fn translate_request<'a>(&'a self, text: &'a str, options: &SpeechOptions) -> ElevenLabsRequest<'a> {
        if options.pitch.is_some() {
            tracing::debug!("ElevenLabs has no pitch control, ignoring pitch");
        }
        ElevenLabsRequest {
            text,
            model_id: &self.model,
            voice_settings: options.rate.map(|rate| ElevenLabsVoiceSettings {
                speed: rate.clamp(0.7, 1.2),
            }),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSpeech {
    async fn synthesize(&self, text: &str, options: &SpeechOptions) -> Result<Vec<u8>, LlmError> {
        let response = self
            .client
            .post(self.url(options)?)
            .header("xi-api-key", &self.api_key)
            .header("Accept", "audio/mpeg")
            .json(&self.translate_request(text, options))
            .send()
            .await
            .map_err(|e| LlmError::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status(status.as_u16(), &body));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read audio: {e}")))?;
        Ok(audio.to_vec())
    }

    fn provider(&self) -> &'static str {
        "elevenlabs"
    }
}

#[derive(Debug, Serialize)]
struct ElevenLabsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice_settings: Option<ElevenLabsVoiceSettings>,
}

#[derive(Debug, Serialize)]
struct ElevenLabsVoiceSettings {
    speed: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmErrorKind;
    use serde_json::json;

    #[test]
    fn test_openai_request_defaults() {
        let speech = OpenAISpeech::new(
            "sk-test".into(),
            "tts-1".into(),
            "alloy".into(),
            "https://api.openai.com/v1",
        )
        .unwrap();

        let wire =
            serde_json::to_value(speech.translate_request("هلا", &SpeechOptions::default())).unwrap();
        assert_eq!(
            wire,
            json!({"model": "tts-1", "voice": "alloy", "input": "هلا", "response_format": "mp3"})
        );
    }

    #[test]
    fn test_openai_request_overrides_and_clamps() {
        let speech = OpenAISpeech::new(
            "sk-test".into(),
            "tts-1".into(),
            "alloy".into(),
            "https://api.openai.com/v1",
        )
        .unwrap();
        let options = SpeechOptions {
            voice: Some("nova".into()),
            rate: Some(10.0),
            pitch: Some(2.0),
        };

        let wire = serde_json::to_value(speech.translate_request("hi", &options)).unwrap();
        assert_eq!(wire["voice"], "nova");
        assert_eq!(wire["speed"], json!(4.0));
        assert!(wire.get("pitch").is_none());
    }

    #[test]
    fn test_elevenlabs_url_and_body() {
        let speech =
            ElevenLabsSpeech::new("xi-test".into(), "eleven_multilingual_v2".into(), "voice123".into())
                .unwrap();

        assert_eq!(
            speech.url(&SpeechOptions::default()).unwrap().as_str(),
            "https://api.elevenlabs.io/v1/text-to-speech/voice123"
        );
        let options = SpeechOptions {
            voice: Some("other_Voice-2".into()),
            rate: Some(0.5),
            pitch: None,
        };
        assert_eq!(
            speech.url(&options).unwrap().as_str(),
            "https://api.elevenlabs.io/v1/text-to-speech/other_Voice-2"
        );

        let wire = serde_json::to_value(speech.translate_request("hi", &options)).unwrap();
        assert_eq!(wire["model_id"], "eleven_multilingual_v2");
        assert_eq!(wire["voice_settings"]["speed"], json!(0.7_f32));
    }

    #[test]
    fn test_elevenlabs_voice_cannot_escape_text_to_speech() {
        let speech =
            ElevenLabsSpeech::new("xi-test".into(), "eleven_multilingual_v2".into(), "voice123".into())
                .unwrap();

        for voice in ["../../v1/voices/add?x=", "..", "a/b", "id#frag", "id?x=1", "", "صوت"] {
            let options = SpeechOptions {
                voice: Some(voice.into()),
                ..SpeechOptions::default()
            };
            let err = speech.url(&options).unwrap_err();
            assert_eq!(err.kind, LlmErrorKind::InvalidRequest, "voice {voice:?}");
        }
    }
}
