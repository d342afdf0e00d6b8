//! Service configuration from the environment
//!
//! A `.env` file in the working directory is loaded first when present.

use crate::llm::openai::DEFAULT_BASE_URL;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_HISTORY_PATH: &str = "chat_history.json";
const DEFAULT_MODEL: &str = "gpt-4";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 150;
const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";
const DEFAULT_TTS_MODEL: &str = "tts-1";
const DEFAULT_TTS_VOICE: &str = "alloy";
const DEFAULT_ELEVENLABS_MODEL: &str = "eleven_multilingual_v2";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} not found in environment variables. Set it or add it to .env")]
    Missing(&'static str),
    #[error("Unknown TTS provider '{0}' (expected 'openai' or 'elevenlabs')")]
    UnknownTtsProvider(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub history_path: PathBuf,
    pub openai: OpenAIConfig,
    pub completion: CompletionConfig,
    pub transcription_model: String,
    pub speech: SpeechConfig,
}

#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
}

/// Fixed decoding parameters for every chat turn
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpeechConfig {
    OpenAI {
        model: String,
        voice: String,
    },
    ElevenLabs {
        api_key: String,
        voice_id: String,
        model: String,
    },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::info!(path = %path.display(), "Loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "Could not load .env file"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let var_or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let api_key = var("OPENAI_API_KEY").ok_or(ConfigError::Missing("OPENAI_API_KEY"))?;

        let speech = match var_or("NEXTA_TTS_PROVIDER", "openai")
            .to_ascii_lowercase()
            .as_str()
        {
            "openai" => SpeechConfig::OpenAI {
                model: var_or("NEXTA_TTS_MODEL", DEFAULT_TTS_MODEL),
                voice: var_or("NEXTA_TTS_VOICE", DEFAULT_TTS_VOICE),
            },
            "elevenlabs" => SpeechConfig::ElevenLabs {
                api_key: var("ELEVENLABS_API_KEY").ok_or(ConfigError::Missing("ELEVENLABS_API_KEY"))?,
                voice_id: var("ELEVENLABS_VOICE_ID")
                    .ok_or(ConfigError::Missing("ELEVENLABS_VOICE_ID"))?,
                model: var_or("ELEVENLABS_MODEL", DEFAULT_ELEVENLABS_MODEL),
            },
            other => return Err(ConfigError::UnknownTtsProvider(other.to_string())),
        };

        Ok(Self {
            port: parse_or(var("NEXTA_PORT"), "NEXTA_PORT", DEFAULT_PORT),
            history_path: PathBuf::from(var_or("NEXTA_HISTORY_PATH", DEFAULT_HISTORY_PATH)),
            openai: OpenAIConfig {
                api_key,
                base_url: var_or("OPENAI_BASE_URL", DEFAULT_BASE_URL),
            },
            completion: CompletionConfig {
                model: var_or("NEXTA_MODEL", DEFAULT_MODEL),
                temperature: parse_or(var("NEXTA_TEMPERATURE"), "NEXTA_TEMPERATURE", DEFAULT_TEMPERATURE),
                max_tokens: parse_or(var("NEXTA_MAX_TOKENS"), "NEXTA_MAX_TOKENS", DEFAULT_MAX_TOKENS),
            },
            transcription_model: var_or("NEXTA_TRANSCRIPTION_MODEL", DEFAULT_TRANSCRIPTION_MODEL),
            speech,
        })
    }
}

fn parse_or<T: FromStr + Copy>(value: Option<String>, key: &str, default: T) -> T {
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Invalid value, using default");
            default
        }),
    }
}
